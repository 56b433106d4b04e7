use std::fmt::{self, Write};

/// 1-indexed source position, taken from the token that starts a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed source file: top-level declarations in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(Function),
    Struct(Struct),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Prop>,
    pub return_type: Option<String>, // None = no value
    pub body: Vec<Expression>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub props: Vec<Prop>,
    pub methods: Vec<Function>,
    pub pos: Position,
}

/// `name: Type`, used for parameters and struct fields
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub name: String,
    pub type_name: String,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    IntLiteral(i32), // C `int`
    StringLiteral(String), // Quotes stripped, escapes untouched
    ArrayLiteral(Vec<Expression>),
    Return(Box<Expression>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// Function call, struct construction or builtin invocation
    Call {
        callee: String,
        params: Vec<Expression>,
    },
    Paren(Box<Expression>),
    VariableDeclaration {
        name: String,
        type_name: String,
        init: Box<Expression>,
    },
    VariableAssignment {
        name: String,
        init: Box<Expression>,
    },
    VariableRef(String),
    /// `target.inner` where inner is a call, a field, a field assignment or another accessor
    Accessor {
        target: String,
        inner: Box<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

// Tree dump used by `tern parse`

impl Program {
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        out.push_str("Program\n");
        for decl in &self.declarations {
            match decl {
                Declaration::Function(func) => write_function(&mut out, func, 1),
                Declaration::Struct(st) => {
                    indent(&mut out, 1);
                    let _ = writeln!(out, "Struct {}", st.name);
                    for prop in &st.props {
                        indent(&mut out, 2);
                        let _ = writeln!(out, "Prop {}: {}", prop.name, prop.type_name);
                    }
                    for method in &st.methods {
                        write_function(&mut out, method, 2);
                    }
                }
            }
        }
        out
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_function(out: &mut String, func: &Function, level: usize) {
    indent(out, level);
    let params: Vec<String> = func
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_name))
        .collect();
    let _ = write!(out, "Function {}({})", func.name, params.join(", "));
    if let Some(ret) = &func.return_type {
        let _ = write!(out, " {}", ret);
    }
    out.push('\n');
    for expr in &func.body {
        write_expression(out, expr, level + 1);
    }
}

fn write_expression(out: &mut String, expr: &Expression, level: usize) {
    indent(out, level);
    match &expr.kind {
        ExpressionKind::IntLiteral(v) => {
            let _ = writeln!(out, "Int {}", v);
        }
        ExpressionKind::StringLiteral(s) => {
            let _ = writeln!(out, "String \"{}\"", s);
        }
        ExpressionKind::ArrayLiteral(items) => {
            out.push_str("Array\n");
            for item in items {
                write_expression(out, item, level + 1);
            }
        }
        ExpressionKind::Return(inner) => {
            out.push_str("Return\n");
            write_expression(out, inner, level + 1);
        }
        ExpressionKind::Binary { op, lhs, rhs } => {
            let _ = writeln!(out, "Binary {}", op.symbol());
            write_expression(out, lhs, level + 1);
            write_expression(out, rhs, level + 1);
        }
        ExpressionKind::Call { callee, params } => {
            let _ = writeln!(out, "Call {}", callee);
            for param in params {
                write_expression(out, param, level + 1);
            }
        }
        ExpressionKind::Paren(inner) => {
            out.push_str("Paren\n");
            write_expression(out, inner, level + 1);
        }
        ExpressionKind::VariableDeclaration {
            name,
            type_name,
            init,
        } => {
            let _ = writeln!(out, "VarDecl {}: {}", name, type_name);
            write_expression(out, init, level + 1);
        }
        ExpressionKind::VariableAssignment { name, init } => {
            let _ = writeln!(out, "Assign {}", name);
            write_expression(out, init, level + 1);
        }
        ExpressionKind::VariableRef(name) => {
            let _ = writeln!(out, "Var {}", name);
        }
        ExpressionKind::Accessor { target, inner } => {
            let _ = writeln!(out, "Accessor {}", target);
            write_expression(out, inner, level + 1);
        }
    }
}
