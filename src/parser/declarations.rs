use super::helpers::is_type_start;
use super::{ParseError, Parser};
use crate::ast::{Function, Prop, Struct};
use crate::lexer::TokenKind;

// Function, struct and property declarations
impl<'a> Parser<'a> {
    /// Parse `fn name(a: T, b: U) Ret { ... }`; the return type is optional
    pub(super) fn parse_function(&mut self, depth: usize) -> Result<Function, ParseError> {
        self.check_depth(depth)?;

        let pos = self.position();
        self.consume(TokenKind::Fn, "'fn'")?;
        let name = self.expect_identifier("function name")?;
        self.consume(TokenKind::LParen, "'(' after function name")?;

        let mut params = Vec::new();
        loop {
            if self.peek_kind_is(TokenKind::RParen) {
                self.advance();
                break;
            }

            params.push(self.parse_prop()?);

            match self.peek_kind() {
                TokenKind::Comma => self.advance(),
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.new_unexpected_token("',' or ')' in parameter list")),
            }
        }

        let return_type = if is_type_start(self.peek_kind()) {
            Some(self.parse_type_name()?)
        } else {
            None
        };

        self.consume(TokenKind::LBrace, "'{' to open function body")?;
        let body = self.parse_block(depth + 1)?;

        Ok(Function {
            name,
            params,
            return_type,
            body,
            pos,
        })
    }

    /// Parse expressions up to and including the closing brace.
    /// Each expression ends at a line break or at the brace itself.
    fn parse_block(&mut self, depth: usize) -> Result<Vec<crate::ast::Expression>, ParseError> {
        let mut body = Vec::new();

        loop {
            self.skip_newlines();

            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(self.new_unexpected_token("'}' to close function body")),
                _ => {}
            }

            body.push(self.parse_expression(depth)?);

            match self.peek_kind() {
                TokenKind::Newline | TokenKind::RBrace => {}
                _ => return Err(self.new_unexpected_token("newline or '}' after expression")),
            }
        }

        Ok(body)
    }

    /// Parse `struct Name { field: Type ... fn method() {} ... }`
    pub(super) fn parse_struct(&mut self, depth: usize) -> Result<Struct, ParseError> {
        self.check_depth(depth)?;

        let pos = self.position();
        self.consume(TokenKind::Struct, "'struct'")?;
        let name = self.expect_identifier("struct name")?;
        self.consume(TokenKind::LBrace, "'{' to open struct body")?;

        let mut props = Vec::new();
        let mut methods = Vec::new();

        loop {
            self.skip_newlines();

            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Fn => methods.push(self.parse_function(depth + 1)?),
                TokenKind::Identifier => props.push(self.parse_prop()?),
                _ => return Err(self.new_unexpected_token("property, method or '}' in struct body")),
            }
        }

        Ok(Struct {
            name,
            props,
            methods,
            pos,
        })
    }

    /// Parse `name: Type`
    pub(super) fn parse_prop(&mut self) -> Result<Prop, ParseError> {
        let pos = self.position();
        let name = self.expect_identifier("property name")?;
        self.consume(TokenKind::Colon, "':' after property name")?;
        let type_name = self.parse_type_name()?;

        Ok(Prop {
            name,
            type_name,
            pos,
        })
    }

    /// Parse a type reference: a built-in type or a struct name
    pub(super) fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let token = self.current_token();
        if !is_type_start(token.kind) {
            return Err(self.new_unexpected_token("type name"));
        }
        self.advance();
        Ok(token.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::to_program;
    use crate::ast::{Declaration, ExpressionKind, Function, Struct};

    fn first_function(source: &str) -> Function {
        match to_program(source).unwrap().declarations.remove(0) {
            Declaration::Function(f) => f,
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn first_struct(source: &str) -> Struct {
        match to_program(source).unwrap().declarations.remove(0) {
            Declaration::Struct(s) => s,
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_function_with_params_and_return_type() {
        let func = first_function("fn add(a: Int, b: Int) Int { return a + b }");
        assert_eq!(func.name, "add");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].name, "a");
        assert_eq!(func.params[0].type_name, "Int");
        assert_eq!(func.params[1].name, "b");
        assert_eq!(func.return_type.as_deref(), Some("Int"));
        assert_eq!(func.body.len(), 1);
        assert!(matches!(func.body[0].kind, ExpressionKind::Return(_)));
    }

    #[test]
    fn test_missing_return_type_means_no_value() {
        let func = first_function("fn main() {\n}\n");
        assert_eq!(func.return_type, None);
        assert!(func.params.is_empty());
        assert!(func.body.is_empty());
    }

    #[test]
    fn test_struct_typed_params_and_return() {
        let func = first_function("fn mirror(p: Point, s: String, xs: IntArray) Point {\n return p\n}");
        let types: Vec<&str> = func.params.iter().map(|p| p.type_name.as_str()).collect();
        assert_eq!(types, vec!["Point", "String", "IntArray"]);
        assert_eq!(func.return_type.as_deref(), Some("Point"));
    }

    #[test]
    fn test_multiline_body() {
        let func = first_function("fn main() {\n  var a: Int = 1\n\n  var b: Int = 2\n  println(a, b)\n}\n");
        assert_eq!(func.body.len(), 3);
        assert!(matches!(func.body[2].kind, ExpressionKind::Call { .. }));
    }

    #[test]
    fn test_expressions_must_be_separated() {
        let err = to_program("fn main() { var a: Int = 1 var b: Int = 2 }").unwrap_err();
        assert!(err.message.contains("newline or '}'"));
    }

    #[test]
    fn test_unclosed_body() {
        let err = to_program("fn main() {\n return 1\n").unwrap_err();
        assert!(err.message.contains("'}'"));
        assert!(err.message.contains("end of file"));
    }

    #[test]
    fn test_missing_paren_after_name() {
        let err = to_program("fn main {}").unwrap_err();
        assert!(err.message.contains("'('"));
    }

    #[test]
    fn test_bad_parameter_separator() {
        let err = to_program("fn f(a: Int b: Int) {}").unwrap_err();
        assert!(err.message.contains("',' or ')'"));
    }

    #[test]
    fn test_missing_parameter_type() {
        let err = to_program("fn f(a) {}").unwrap_err();
        assert!(err.message.contains("':'"));
    }

    #[test]
    fn test_struct_on_one_line() {
        let st = first_struct("struct Point { x: Int y: Int fn sum() Int { return self.x + self.y } }");
        assert_eq!(st.name, "Point");
        assert_eq!(st.props.len(), 2);
        assert_eq!(st.props[1].name, "y");
        assert_eq!(st.methods.len(), 1);
        assert_eq!(st.methods[0].name, "sum");
        assert!(st.methods[0].params.is_empty());
    }

    #[test]
    fn test_struct_multiline() {
        let source = "struct Person {\n  name: String\n  age: Int\n\n  fn toString() String {\n    return self.name\n  }\n}\n";
        let st = first_struct(source);
        assert_eq!(st.props.len(), 2);
        assert_eq!(st.props[0].type_name, "String");
        assert_eq!(st.methods[0].return_type.as_deref(), Some("String"));
    }

    #[test]
    fn test_invalid_struct_member() {
        let err = to_program("struct P {\n  42\n}").unwrap_err();
        assert!(err.message.contains("struct body"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_positions_recorded() {
        let st = first_struct("\n\nstruct P {\n  x: Int\n}");
        assert_eq!((st.pos.line, st.pos.column), (3, 1));
        assert_eq!((st.props[0].pos.line, st.props[0].pos.column), (4, 3));
    }
}
