use super::FunctionGenerator;
use super::context::TO_STRING;
use super::error::{GenerateError, GenerateErrorKind};
use super::types::ResolvedType;
use crate::ast::{Expression, ExpressionKind, Position};

const PRINTLN: &str = "println";

pub(super) fn is_builtin(callee: &str) -> bool {
    matches!(callee, PRINTLN)
}

impl<'a> FunctionGenerator<'a> {
    pub(super) fn lower_builtin(
        &mut self,
        callee: &str,
        params: &[Expression],
        pos: Position,
    ) -> Result<String, GenerateError> {
        match callee {
            PRINTLN => self.lower_println(params),
            _ => Err(GenerateError::new(
                GenerateErrorKind::Unsupported,
                format!("Unknown builtin: {}", callee),
                pos,
            )),
        }
    }

    /// `println(a, b, ...)` becomes one `printf` whose placeholders follow
    /// the static type of each argument
    fn lower_println(&mut self, params: &[Expression]) -> Result<String, GenerateError> {
        let mut formats = Vec::with_capacity(params.len());
        let mut args = Vec::with_capacity(params.len());

        for param in params {
            let ty = self.static_type(param)?;
            match ty {
                Some(ResolvedType::Int) => {
                    formats.push("%d");
                    args.push(self.lower(param)?);
                }
                Some(ResolvedType::String) => {
                    formats.push("%s");
                    args.push(format!("{}->value", self.lower(param)?));
                }
                Some(ResolvedType::Struct(name)) => {
                    formats.push("%s");
                    args.push(format!("{}__{}({})->value", name, TO_STRING, self.lower(param)?));
                }
                Some(ty) if matches!(param.kind, ExpressionKind::VariableRef(_)) => {
                    return Err(GenerateError::new(
                        GenerateErrorKind::UnknownType,
                        format!("Unknown type: {}", ty),
                        param.pos,
                    ));
                }
                _ => {
                    return Err(GenerateError::new(
                        GenerateErrorKind::Unsupported,
                        "Not handling this case yet".to_string(),
                        param.pos,
                    ));
                }
            }
        }

        if args.is_empty() {
            return Ok("printf(\"\\n\")".to_string());
        }
        Ok(format!("printf(\"{}\\n\", {})", formats.join(" "), args.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::GenerateErrorKind;
    use super::super::test_support::{body_of, to_c};

    fn main_body(source: &str) -> Vec<String> {
        let c = to_c(&format!("fn main() {{\n{}\n}}\n", source)).unwrap();
        body_of(&c, "main")
    }

    #[test]
    fn test_is_builtin() {
        assert!(super::is_builtin("println"));
        assert!(!super::is_builtin("print"));
        assert!(!super::is_builtin("printf"));
    }

    #[test]
    fn test_println_string_and_int_variable() {
        assert_eq!(
            main_body("var n: Int = 5\nprintln(\"count:\", n)"),
            vec![
                "int n = 5;",
                "printf(\"%s %d\\n\", String__make(\"count:\")->value, n);",
                "return 0;",
            ]
        );
    }

    #[test]
    fn test_println_mixed_with_struct() {
        let c = to_c("struct P {\n}\nfn main() {\n var p: P = P()\n println(\"a\", 1, p)\n}\n").unwrap();
        assert_eq!(
            body_of(&c, "main")[1],
            "printf(\"%s %d %s\\n\", String__make(\"a\")->value, 1, P__toString(p)->value);"
        );
    }

    #[test]
    fn test_println_string_variable() {
        assert_eq!(
            main_body("var s: String = \"hey\"\nprintln(s)")[1],
            "printf(\"%s\\n\", s->value);"
        );
    }

    #[test]
    fn test_println_integer_expressions() {
        assert_eq!(
            main_body("println(1 + 2, (3))")[0],
            "printf(\"%d %d\\n\", 1 + 2, (3));"
        );
    }

    #[test]
    fn test_println_typed_calls() {
        let c = to_c("fn answer() Int {\n return 42\n}\nfn main() {\n println(answer())\n}\n").unwrap();
        assert_eq!(body_of(&c, "main")[0], "printf(\"%d\\n\", answer());");
    }

    #[test]
    fn test_println_without_arguments() {
        assert_eq!(main_body("println()")[0], "printf(\"\\n\");");
    }

    #[test]
    fn test_println_array_variable_is_unknown_type() {
        let c = to_c("fn main() {\n var xs: IntArray = [1]\n println(xs)\n}\n");
        let err = c.unwrap_err();
        assert_eq!(err.kind, GenerateErrorKind::UnknownType);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_println_unhandled_shape() {
        let err = to_c("fn main() {\n println(mystery())\n}\n").unwrap_err();
        assert_eq!(err.kind, GenerateErrorKind::Unsupported);
        assert_eq!(err.message, "Not handling this case yet");

        let err = to_c("fn main() {\n println([1])\n}\n").unwrap_err();
        assert_eq!(err.kind, GenerateErrorKind::Unsupported);
    }

    #[test]
    fn test_println_undeclared_variable() {
        let err = to_c("fn main() {\n println(ghost)\n}\n").unwrap_err();
        assert_eq!(err.kind, GenerateErrorKind::UndeclaredVariable);
    }
}
