use super::error::ParseError;
use crate::ast::{BinaryOp, Position};
use crate::lexer::{Token, TokenKind};

// Operator precedence levels; multiplicative binds tighter than additive
pub(super) fn get_precedence(token_kind: TokenKind) -> Option<u8> {
    binary_operator(token_kind).map(|(_, precedence)| precedence)
}

pub(super) fn binary_operator(token_kind: TokenKind) -> Option<(BinaryOp, u8)> {
    match token_kind {
        TokenKind::Plus => Some((BinaryOp::Add, 20)),
        TokenKind::Minus => Some((BinaryOp::Sub, 20)),
        TokenKind::Star => Some((BinaryOp::Mul, 40)),
        TokenKind::Slash => Some((BinaryOp::Div, 40)),
        _ => None,
    }
}

pub(super) fn is_type_start(token_kind: TokenKind) -> bool {
    matches!(
        token_kind,
        TokenKind::IntType | TokenKind::IntArrayType | TokenKind::StringType | TokenKind::Identifier
    )
}

// Parser helper methods
impl<'a> super::Parser<'a> {
    pub(super) fn new_unexpected_token(&self, expected: &str) -> ParseError {
        ParseError::unexpected_token(expected, self.current_token(), self.current)
    }

    // Helper: Check recursion depth limit
    pub(super) fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth >= self.limits.max_expr_depth {
            return Err(ParseError::from_token(
                format!(
                    "Parsing nesting too deep: {} levels (max {}). Consider simplifying.",
                    depth, self.limits.max_expr_depth
                ),
                self.current_token(),
                self.current,
            ));
        }
        Ok(())
    }

    /// Helper: Consume a specific token kind or error; returns the consumed token
    pub(super) fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<&'a Token, ParseError> {
        let token = self.current_token();
        if token.kind != kind {
            return Err(self.new_unexpected_token(expected));
        }
        self.advance();
        Ok(token)
    }

    /// Helper: Consume an identifier and return its text
    pub(super) fn expect_identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        Ok(self.consume(TokenKind::Identifier, expected)?.text.clone())
    }

    /// Helper: Advance to the next token
    pub(super) fn advance(&mut self) {
        self.current = (self.current + 1).min(self.tokens.len());
    }

    pub(super) fn peek_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Helper: peek the token n positions ahead of the current one
    pub(super) fn peek_next_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.current + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(super) fn peek_kind_is(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    // Helper: Get current token; past the end this is always the end marker
    pub(super) fn current_token(&self) -> &'a Token {
        self.tokens.get(self.current).unwrap_or(self.eof)
    }

    pub(super) fn position(&self) -> Position {
        let token = self.current_token();
        Position::new(token.line, token.column)
    }

    // Helper: Skip consecutive newlines
    pub(super) fn skip_newlines(&mut self) {
        while self.peek_kind_is(TokenKind::Newline) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_levels() {
        assert_eq!(get_precedence(TokenKind::Plus), Some(20));
        assert_eq!(get_precedence(TokenKind::Minus), Some(20));
        assert_eq!(get_precedence(TokenKind::Star), Some(40));
        assert_eq!(get_precedence(TokenKind::Slash), Some(40));
        assert_eq!(get_precedence(TokenKind::Newline), None);
        assert_eq!(get_precedence(TokenKind::Dot), None);
        assert_eq!(get_precedence(TokenKind::Identifier), None);
    }

    #[test]
    fn test_binary_operator_mapping() {
        assert_eq!(binary_operator(TokenKind::Slash), Some((BinaryOp::Div, 40)));
        assert_eq!(binary_operator(TokenKind::Equals), None);
    }

    #[test]
    fn test_type_start() {
        assert!(is_type_start(TokenKind::IntType));
        assert!(is_type_start(TokenKind::Identifier));
        assert!(!is_type_start(TokenKind::LBrace));
    }
}
