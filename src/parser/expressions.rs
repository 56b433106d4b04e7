use super::helpers::{binary_operator, get_precedence};
use super::{ParseError, Parser};
use crate::ast::{Expression, ExpressionKind};
use crate::lexer::TokenKind;

// Recursive expression parsing methods
impl<'a> Parser<'a> {
    /// Parse a full expression: a primary followed by any binary operators
    pub(super) fn parse_expression(&mut self, depth: usize) -> Result<Expression, ParseError> {
        self.check_depth(depth)?;
        let lhs = self.parse_primary(depth)?;
        self.parse_binary_rhs(depth, 0, lhs)
    }

    /// Precedence climbing over `+ - * /`.
    ///
    /// Operators below `min_precedence` are left for the caller. After reading an
    /// operator and its right operand, a following operator that binds strictly
    /// tighter is folded into the right operand first; equal precedence groups
    /// left to right. A line break has no precedence and ends the expression.
    fn parse_binary_rhs(
        &mut self,
        depth: usize,
        min_precedence: u8,
        mut lhs: Expression,
    ) -> Result<Expression, ParseError> {
        self.check_depth(depth)?;

        loop {
            let (op, precedence) = match binary_operator(self.peek_kind()) {
                Some((op, p)) if p >= min_precedence => (op, p),
                _ => return Ok(lhs),
            };
            self.advance();

            let mut rhs = self.parse_primary(depth + 1)?;

            if let Some(next) = get_precedence(self.peek_kind()) {
                if next > precedence {
                    rhs = self.parse_binary_rhs(depth + 1, precedence + 1, rhs)?;
                }
            }

            let pos = lhs.pos;
            lhs = Expression::new(
                ExpressionKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                pos,
            );
        }
    }

    /// Parse a primary expression, dispatched on the current token
    fn parse_primary(&mut self, depth: usize) -> Result<Expression, ParseError> {
        self.check_depth(depth)?;

        let token = self.current_token();
        let pos = self.position();

        match token.kind {
            TokenKind::Integer => {
                let value = token.text.parse::<i32>().map_err(|_| {
                    ParseError::from_token(
                        format!("Integer literal out of range: {}", token.text),
                        token,
                        self.current,
                    )
                })?;
                self.advance();
                Ok(Expression::new(ExpressionKind::IntLiteral(value), pos))
            }

            TokenKind::String => {
                let text = &token.text;
                let content = text
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .unwrap_or(text);
                self.advance();
                Ok(Expression::new(
                    ExpressionKind::StringLiteral(content.to_string()),
                    pos,
                ))
            }

            TokenKind::LBracket => self.parse_array_literal(depth + 1),

            TokenKind::Return => {
                self.advance();
                let inner = self.parse_expression(depth + 1)?;
                Ok(Expression::new(ExpressionKind::Return(Box::new(inner)), pos))
            }

            TokenKind::Var => self.parse_variable_declaration(depth + 1),

            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(depth + 1)?;
                self.consume(TokenKind::RParen, "')'")?;
                Ok(Expression::new(ExpressionKind::Paren(Box::new(inner)), pos))
            }

            TokenKind::Identifier => self.parse_identifier_expression(depth + 1),

            _ => Err(self.new_unexpected_token("expression")),
        }
    }

    /// `[a, b, c]`; commas and line breaks between elements are skipped
    fn parse_array_literal(&mut self, depth: usize) -> Result<Expression, ParseError> {
        self.check_depth(depth)?;

        let pos = self.position();
        self.consume(TokenKind::LBracket, "'['")?;

        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => self.advance(),
                TokenKind::Eof => return Err(self.new_unexpected_token("']'")),
                _ => items.push(self.parse_expression(depth + 1)?),
            }
        }

        Ok(Expression::new(ExpressionKind::ArrayLiteral(items), pos))
    }

    /// `var name: Type = expr`
    fn parse_variable_declaration(&mut self, depth: usize) -> Result<Expression, ParseError> {
        let pos = self.position();
        self.consume(TokenKind::Var, "'var'")?;
        let name = self.expect_identifier("variable name")?;
        self.consume(TokenKind::Colon, "':' after variable name")?;
        let type_name = self.parse_type_name()?;
        self.consume(TokenKind::Equals, "'=' in variable declaration")?;
        let init = self.parse_expression(depth + 1)?;

        Ok(Expression::new(
            ExpressionKind::VariableDeclaration {
                name,
                type_name,
                init: Box::new(init),
            },
            pos,
        ))
    }

    /// An identifier is a call, an accessor, an assignment or a plain reference,
    /// depending on the token that follows it
    fn parse_identifier_expression(&mut self, depth: usize) -> Result<Expression, ParseError> {
        self.check_depth(depth)?;

        let pos = self.position();
        let follower = self.peek_next_kind(1);
        let name = self.expect_identifier("identifier")?;

        let kind = match follower {
            TokenKind::LParen => ExpressionKind::Call {
                callee: name,
                params: self.parse_call_arguments(depth + 1)?,
            },
            TokenKind::Dot => {
                self.advance();
                if !self.peek_kind_is(TokenKind::Identifier) {
                    return Err(self.new_unexpected_token("field or method name after '.'"));
                }
                let inner = self.parse_identifier_expression(depth + 1)?;
                ExpressionKind::Accessor {
                    target: name,
                    inner: Box::new(inner),
                }
            }
            TokenKind::Equals => {
                self.advance();
                let init = self.parse_expression(depth + 1)?;
                ExpressionKind::VariableAssignment {
                    name,
                    init: Box::new(init),
                }
            }
            _ => ExpressionKind::VariableRef(name),
        };

        Ok(Expression::new(kind, pos))
    }

    /// `(arg, arg, ...)`
    fn parse_call_arguments(&mut self, depth: usize) -> Result<Vec<Expression>, ParseError> {
        self.check_depth(depth)?;
        self.consume(TokenKind::LParen, "'('")?;

        let mut args = Vec::new();
        loop {
            if self.peek_kind_is(TokenKind::RParen) {
                self.advance();
                break;
            }

            args.push(self.parse_expression(depth + 1)?);

            match self.peek_kind() {
                TokenKind::Comma => self.advance(),
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.new_unexpected_token("',' or ')' in argument list")),
            }
        }

        Ok(args)
    }
}
