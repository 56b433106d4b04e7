use std::io;
use thiserror::Error;

use crate::ast::Position;
use crate::codegen::GenerateError;
use crate::config::ConfigError;
use crate::lexer::LexError;
use crate::limits::LimitError;
use crate::parser::ParseError;
use crate::toolchain::ToolchainError;

/// Any failure between reading a source file and producing an executable
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Generate(#[from] GenerateError),

    #[error("{0}")]
    Limits(#[from] LimitError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Toolchain(#[from] ToolchainError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CompileError {
    /// Source position the error points at, when it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Lex(e) => Some(Position::new(e.line, e.column)),
            CompileError::Parse(e) => Some(e.position()),
            CompileError::Generate(e) => Some(e.position()),
            _ => None,
        }
    }

    /// Error message followed by the offending source line and a caret
    pub fn display(&self, src: &str) -> String {
        let mut result = format!("Error: {}", self);
        let Some(pos) = self.position() else {
            return result;
        };
        let Some(line) = src.lines().nth(pos.line.saturating_sub(1)) else {
            return result;
        };

        let gutter = pos.line.to_string().len();
        let caret_offset: usize = line
            .chars()
            .take(pos.column.saturating_sub(1))
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum();

        result.push_str(&format!("\n{} --> line {}, col {}", " ".repeat(gutter), pos.line, pos.column));
        result.push_str(&format!("\n{} |\n", " ".repeat(gutter)));
        result.push_str(&format!("{} | {}\n", pos.line, line.replace('\t', "    ")));
        result.push_str(&format!("{} | {}^", " ".repeat(gutter), " ".repeat(caret_offset)));
        result
    }
}
