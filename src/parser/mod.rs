// Parser module - splits parser into logical components
mod declarations;
mod error;
mod expressions;
mod helpers;

// Public exports
pub use error::ParseError;

use crate::ast::{Declaration, Program};
use crate::lexer::{Token, TokenKind};
use crate::limits::CompilerLimits;

// Stands in for the end marker when a token slice does not end with one
static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    text: String::new(),
    line: 0,
    column: 0,
};

// Parser structure: a cursor over a borrowed token slice
pub struct Parser<'a> {
    tokens: &'a [Token],
    eof: &'a Token,
    current: usize,
    limits: CompilerLimits,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], limits: CompilerLimits) -> Self {
        let eof = tokens
            .last()
            .filter(|t| t.kind == TokenKind::Eof)
            .unwrap_or(&EOF_TOKEN);

        Self {
            tokens,
            eof,
            current: 0,
            limits,
        }
    }

    // Main parsing entry point
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline => self.advance(),
                TokenKind::Fn => {
                    let function = self.parse_function(0)?;
                    program.declarations.push(Declaration::Function(function));
                }
                TokenKind::Struct => {
                    let st = self.parse_struct(0)?;
                    program.declarations.push(Declaration::Struct(st));
                }
                _ => {
                    return Err(ParseError::from_token(
                        format!(
                            "Don't know how to parse {} at top level (expected 'fn' or 'struct')",
                            error::describe(self.current_token())
                        ),
                        self.current_token(),
                        self.current,
                    ));
                }
            }
        }

        Ok(program)
    }
}

// Public API function
pub fn parse(tokens: &[Token], limits: CompilerLimits) -> Result<Program, ParseError> {
    Parser::new(tokens, limits).parse()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::lexer::lex;

    pub fn to_program(source: &str) -> Result<Program, ParseError> {
        let tokens = lex(source).unwrap();
        parse(&tokens, CompilerLimits::default())
    }
}
