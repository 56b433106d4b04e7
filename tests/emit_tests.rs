use std::fs;
use std::path::Path;

use tern_lang::codegen::GenerateErrorKind;
use tern_lang::limits::CompilerLimits;
use tern_lang::{CompileError, compile_to_c, parse_source};

fn emit(source: &str) -> String {
    compile_to_c(source, &CompilerLimits::default()).unwrap_or_else(|e| panic!("{}", e.display(source)))
}

fn emit_err(source: &str) -> CompileError {
    compile_to_c(source, &CompilerLimits::default()).unwrap_err()
}

#[test]
fn test_unit_layout() {
    let c = emit("struct Point {\n  x: Int\n}\nfn main() {\n  var p: Point = Point()\n}\n");

    let include = c.find("#include \"runtime.h\"").unwrap();
    let typedef = c.find("typedef struct _Point Point;").unwrap();
    let body = c.find("struct _Point {").unwrap();
    let prototype = c.find("Point* Point__make();").unwrap();
    let constructor = c.find("Point* Point__make() {").unwrap();
    let main = c.find("int main() {").unwrap();

    assert!(include < typedef);
    assert!(typedef < body);
    assert!(body < prototype);
    assert!(prototype < constructor);
    assert!(constructor < main);
}

#[test]
fn test_add_function() {
    let c = emit("fn add(a: Int, b: Int) Int { return a + b }");
    assert!(c.contains("int add(int a, int b) {\n\treturn a + b;\n}\n"));
}

#[test]
fn test_point_sum_method() {
    let c = emit("struct Point { x: Int y: Int fn sum() Int { return self.x + self.y } }");
    assert!(c.contains("int Point__sum(Point* self) {\n\treturn self->x + self->y;\n}\n"));
}

#[test]
fn test_println_count() {
    let c = emit("fn main() {\n  var n: Int = 5\n  println(\"count:\", n)\n}\n");
    assert!(c.contains("\tprintf(\"%s %d\\n\", String__make(\"count:\")->value, n);\n"));
}

#[test]
fn test_println_mixed_arguments() {
    let c = emit("struct P {\n}\nfn main() {\n  var p: P = P()\n  println(\"a\", 1, p)\n}\n");
    assert!(c.contains("printf(\"%s %d %s\\n\", String__make(\"a\")->value, 1, P__toString(p)->value);"));
}

#[test]
fn test_method_call_keeps_argument_order() {
    let c = emit(
        "struct Acc {\n  total: Int\n  fn add(a: Int, b: Int, c: Int) Int {\n    return a\n  }\n}\nfn main() {\n  var acc: Acc = Acc()\n  acc.add(3, 1, 2)\n}\n",
    );
    assert!(c.contains("\tAcc__add(acc, 3, 1, 2);\n"));
}

#[test]
fn test_precedence_reaches_c_text_unchanged() {
    let c = emit("fn f() Int {\n  return 1 + 2 * 3 - 4 / 2\n}\n");
    assert!(c.contains("\treturn 1 + 2 * 3 - 4 / 2;\n"));
}

#[test]
fn test_comments_are_ignored() {
    let c = emit("// entry point\nfn main() { // begins here\n  println(1) // one\n}\n");
    assert!(c.contains("int main() {\n\tprintf(\"%d\\n\", 1);\n\treturn 0;\n}\n"));
}

#[test]
fn test_undeclared_variable_is_fatal() {
    let err = emit_err("fn main() {\n  println(x)\n}\n");
    match err {
        CompileError::Generate(e) => assert_eq!(e.kind, GenerateErrorKind::UndeclaredVariable),
        other => panic!("expected generation error, got {:?}", other),
    }
}

#[test]
fn test_parse_errors_stop_before_generation() {
    let err = emit_err("fn main() {\n  var x Int = 1\n}\n");
    assert!(matches!(err, CompileError::Parse(_)));
    assert_eq!(err.position().map(|p| p.line), Some(2));
}

#[test]
fn test_expression_depth_limit() {
    let limits = CompilerLimits {
        max_expr_depth: 8,
        ..CompilerLimits::default()
    };
    let source = format!("fn main() {{\n  return {}1{}\n}}\n", "(".repeat(20), ")".repeat(20));
    let err = compile_to_c(&source, &limits).unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
}

#[test]
fn test_parse_source_tree() {
    let program = parse_source("fn main() Int {\n  return 1 + x\n}\n", &CompilerLimits::default()).unwrap();
    assert_eq!(
        program.to_tree_string(),
        "Program\n  Function main() Int\n    Return\n      Binary +\n        Int 1\n        Var x\n"
    );
}

#[test]
fn test_run_cases_emit() {
    let run_dir = Path::new("tests/run");
    let mut count = 0;
    for entry in fs::read_dir(run_dir).unwrap().flatten() {
        let main_file = entry.path().join("main.tern");
        if main_file.exists() {
            let source = fs::read_to_string(&main_file).unwrap();
            let c = emit(&source);
            assert!(c.contains("int main() {"), "{}", main_file.display());
            count += 1;
        }
    }
    assert!(count > 0);
}

fn generate_kind(source: &str) -> GenerateErrorKind {
    match emit_err(source) {
        CompileError::Generate(e) => e.kind,
        other => panic!("expected generation error, got {:?}", other),
    }
}

#[test]
fn test_c_name_clashes_are_rejected() {
    assert_eq!(
        generate_kind("struct P {\n  x: Int\n  fn make() Int {\n    return 1\n  }\n}\n"),
        GenerateErrorKind::Redeclaration
    );
    assert_eq!(
        generate_kind("struct P {\n  x: Int\n}\nfn P() {\n}\n"),
        GenerateErrorKind::Redeclaration
    );
}

#[test]
fn test_to_string_with_wrong_signature_is_rejected() {
    let source = "struct P {\n  fn toString(n: Int) Int {\n    return n\n  }\n}\nfn main() {\n  var p: P = P()\n  println(p)\n}\n";
    assert_eq!(generate_kind(source), GenerateErrorKind::Unsupported);
}

#[test]
fn test_integer_literal_bounds() {
    let c = emit("fn main() {\n  println(2147483647)\n}\n");
    assert!(c.contains("printf(\"%d\\n\", 2147483647);"));

    let err = emit_err("fn main() {\n  println(3000000000)\n}\n");
    assert!(matches!(err, CompileError::Parse(_)));
}
