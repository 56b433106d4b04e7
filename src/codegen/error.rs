use crate::ast::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateErrorKind {
    /// A name used in a function body was never declared there
    UndeclaredVariable,
    /// A type name that is neither built in nor a declared struct,
    /// or a value whose type cannot be used where it appears
    UnknownType,
    UnknownField,
    UnknownMethod,
    /// Same name declared twice in one scope
    Redeclaration,
    /// Syntax the lowering has no rule for
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct GenerateError {
    pub kind: GenerateErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl GenerateError {
    pub(crate) fn new(kind: GenerateErrorKind, message: String, pos: Position) -> Self {
        Self {
            kind,
            message,
            line: pos.line,
            column: pos.column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generation error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for GenerateError {}
