//! C code generation
//!
//! Lowers a parsed [`Program`] to a single C translation unit that links
//! against the runtime library (see [`crate::runtime`]). The unit is laid out as:
//!
//! 1. `#include`s
//! 2. a type section: forward `typedef`s and bodies of every struct, then
//!    prototypes of every function, constructor and method
//! 3. the lowered declarations, in source order
//!
//! Struct methods are mangled to `<Struct>__<method>` and take the receiver
//! as an explicit `self` pointer. Struct values always live on the heap and
//! are passed around as pointers.

mod builtins;
mod context;
mod error;
mod expressions;
mod symbols;
mod types;

pub use context::{CompilationContext, StructInfo};
pub use error::{GenerateError, GenerateErrorKind};
pub use symbols::SymbolTable;
pub use types::ResolvedType;

use crate::ast::{Declaration, Expression, Function, Position, Program, Struct};
use crate::runtime::RUNTIME_HEADER;
use context::{CONSTRUCTOR, TO_STRING};

/// Lowers whole programs; holds what is known about every declaration
pub struct Generator {
    context: CompilationContext,
}

impl Generator {
    pub fn new(program: &Program) -> Result<Self, GenerateError> {
        Ok(Self {
            context: CompilationContext::from_program(program)?,
        })
    }

    pub fn generate(&self, program: &Program) -> Result<String, GenerateError> {
        let mut code = String::new();
        code.push_str("#include <stdio.h>\n");
        code.push_str("#include <stdlib.h>\n");
        code.push_str(&format!("#include \"{}\"\n", RUNTIME_HEADER));
        code.push('\n');

        code.push_str(&self.type_section());
        code.push_str(&self.prototype_section(program)?);

        for decl in &program.declarations {
            match decl {
                Declaration::Function(func) => code.push_str(&self.lower_function(func, None)?),
                Declaration::Struct(st) => code.push_str(&self.lower_struct(st)?),
            }
        }

        Ok(code)
    }

    fn type_section(&self) -> String {
        let mut code = String::new();
        let mut structs = self.context.structs().peekable();
        if structs.peek().is_none() {
            return code;
        }

        for info in self.context.structs() {
            code.push_str(&format!("typedef struct _{0} {0};\n", info.name));
        }
        code.push('\n');

        for info in structs {
            code.push_str(&format!("struct _{} {{\n", info.name));
            for (field, ty) in &info.fields {
                code.push_str(&format!("\t{} {};\n", ty.c_type(), field));
            }
            code.push_str("};\n\n");
        }

        code
    }

    fn prototype_section(&self, program: &Program) -> Result<String, GenerateError> {
        let mut prototypes = Vec::new();

        for decl in &program.declarations {
            match decl {
                Declaration::Function(func) if func.name == "main" => {}
                Declaration::Function(func) => prototypes.push(self.signature(func, None)?),
                Declaration::Struct(st) => {
                    prototypes.push(constructor_signature(&st.name));
                    if !self.has_user_to_string(st) {
                        prototypes.push(to_string_signature(&st.name));
                    }
                    for method in &st.methods {
                        prototypes.push(self.signature(method, Some(&st.name))?);
                    }
                }
            }
        }

        if prototypes.is_empty() {
            return Ok(String::new());
        }

        let mut code = String::new();
        for prototype in prototypes {
            code.push_str(&prototype);
            code.push_str(";\n");
        }
        code.push('\n');
        Ok(code)
    }

    fn has_user_to_string(&self, st: &Struct) -> bool {
        self.context
            .struct_info(&st.name)
            .is_some_and(|info| info.has_user_to_string)
    }

    /// C function header, e.g. `int Point__sum(Point* self)`
    fn signature(&self, func: &Function, owner: Option<&str>) -> Result<String, GenerateError> {
        let ret = if is_entry_point(func, owner) {
            "int".to_string()
        } else {
            self.context.return_type(func)?.c_type()
        };

        let mut params = Vec::new();
        if let Some(owner) = owner {
            params.push(format!("{}* self", owner));
        }
        for prop in &func.params {
            let ty = self.context.resolve_type(&prop.type_name, prop.pos)?;
            params.push(format!("{} {}", ty.c_type(), prop.name));
        }

        Ok(format!(
            "{} {}({})",
            ret,
            mangled_name(&func.name, owner),
            params.join(", ")
        ))
    }

    /// Lower a free function, or a method when `owner` names its struct
    fn lower_function(&self, func: &Function, owner: Option<&str>) -> Result<String, GenerateError> {
        let mut scope = FunctionGenerator::new(&self.context);

        if let Some(owner) = owner {
            scope.declare("self", ResolvedType::Struct(owner.to_string()), func.pos)?;
        }
        for prop in &func.params {
            let ty = self.context.resolve_type(&prop.type_name, prop.pos)?;
            scope.declare(&prop.name, ty, prop.pos)?;
        }

        let mut code = self.signature(func, owner)?;
        code.push_str(" {\n");
        for expr in &func.body {
            code.push_str(&scope.lower_statement(expr)?);
        }
        if is_entry_point(func, owner) && func.return_type.is_none() {
            code.push_str("\treturn 0;\n");
        }
        code.push_str("}\n\n");

        Ok(code)
    }

    fn lower_struct(&self, st: &Struct) -> Result<String, GenerateError> {
        let mut code = constructor_signature(&st.name);
        code.push_str(" {\n");
        code.push_str(&format!("\t{0}* val = malloc(sizeof({0}));\n", st.name));
        code.push_str("\tif (!val) {\n");
        code.push_str("\t\tprintf(\"Error allocating memory\");\n");
        code.push_str("\t\texit(1);\n");
        code.push_str("\t}\n");
        code.push_str("\treturn val;\n");
        code.push_str("}\n\n");

        if !self.has_user_to_string(st) {
            code.push_str(&to_string_signature(&st.name));
            code.push_str(" {\n");
            code.push_str(&format!("\treturn String__make(\"{}\");\n", st.name));
            code.push_str("}\n\n");
        }

        for method in &st.methods {
            code.push_str(&self.lower_function(method, Some(&st.name))?);
        }

        Ok(code)
    }
}

/// Per-function lowering state: the symbol table and pending hoisted statements
pub(crate) struct FunctionGenerator<'a> {
    context: &'a CompilationContext,
    symbols: SymbolTable,
    hoisted: Vec<String>,
    temp_counter: usize,
}

impl<'a> FunctionGenerator<'a> {
    fn new(context: &'a CompilationContext) -> Self {
        Self {
            context,
            symbols: SymbolTable::new(),
            hoisted: Vec::new(),
            temp_counter: 0,
        }
    }

    /// One source expression becomes one C statement, preceded by its temporaries
    fn lower_statement(&mut self, expr: &Expression) -> Result<String, GenerateError> {
        let lowered = self.lower(expr)?;

        let mut code = String::new();
        for stmt in self.hoisted.drain(..) {
            code.push_str(&format!("\t{};\n", stmt));
        }
        code.push_str(&format!("\t{};\n", lowered));
        Ok(code)
    }

    fn fresh_temp(&mut self) -> String {
        let name = format!("{}{}", TEMP_PREFIX, self.temp_counter);
        self.temp_counter += 1;
        name
    }
}

/// Hoisted temporaries are named `_tmp0`, `_tmp1`, ...; source names may not start with this
const TEMP_PREFIX: &str = "_tmp";

fn reserved_name_error(name: &str, pos: Position) -> GenerateError {
    GenerateError::new(
        GenerateErrorKind::Redeclaration,
        format!("Names starting with {} are reserved: {}", TEMP_PREFIX, name),
        pos,
    )
}

fn mangled_name(name: &str, owner: Option<&str>) -> String {
    match owner {
        Some(owner) => format!("{}__{}", owner, name),
        None => name.to_string(),
    }
}

fn constructor_signature(struct_name: &str) -> String {
    format!("{}* {}()", struct_name, mangled_name(CONSTRUCTOR, Some(struct_name)))
}

fn to_string_signature(struct_name: &str) -> String {
    format!("String* {0}__{1}({0}* self)", struct_name, TO_STRING)
}

/// `fn main()` without a return type still has to return int in C
fn is_entry_point(func: &Function, owner: Option<&str>) -> bool {
    owner.is_none() && func.name == "main" && func.return_type.is_none()
}

// Public API function
pub fn generate(program: &Program) -> Result<String, GenerateError> {
    Generator::new(program)?.generate(program)
}


#[cfg(test)]
mod tests {
    use super::test_support::{body_of, to_c};
    use super::*;

    #[test]
    fn test_free_function() {
        let c = to_c("fn add(a: Int, b: Int) Int { return a + b }").unwrap();
        assert!(c.contains("int add(int a, int b) {\n\treturn a + b;\n}\n"));
        assert!(c.contains("int add(int a, int b);\n"));
        assert!(!c.contains("_tmp"));
    }

    #[test]
    fn test_includes_come_first() {
        let c = to_c("fn main() {\n}\n").unwrap();
        assert!(c.starts_with("#include <stdio.h>\n#include <stdlib.h>\n#include \"runtime.h\"\n\n"));
    }

    #[test]
    fn test_main_without_return_type_returns_zero() {
        let c = to_c("fn main() {\n println(1)\n}\n").unwrap();
        assert!(c.contains("int main() {\n\tprintf(\"%d\\n\", 1);\n\treturn 0;\n}\n"));
        // main gets no prototype
        assert!(!c.contains("int main();"));
    }

    #[test]
    fn test_main_with_return_type_is_untouched() {
        let c = to_c("fn main() Int {\n return 3\n}\n").unwrap();
        assert_eq!(body_of(&c, "main"), vec!["return 3;"]);
    }

    #[test]
    fn test_void_function() {
        let c = to_c("fn shout(s: String) {\n println(s)\n}\n").unwrap();
        assert!(c.contains("void shout(String* s) {\n"));
    }

    #[test]
    fn test_struct_lowering() {
        let c = to_c("struct Point { x: Int y: Int fn sum() Int { return self.x + self.y } }").unwrap();

        assert!(c.contains("typedef struct _Point Point;\n"));
        assert!(c.contains("struct _Point {\n\tint x;\n\tint y;\n};\n"));
        assert!(c.contains(
            "Point* Point__make() {\n\tPoint* val = malloc(sizeof(Point));\n\tif (!val) {\n\t\tprintf(\"Error allocating memory\");\n\t\texit(1);\n\t}\n\treturn val;\n}\n"
        ));
        assert!(c.contains("int Point__sum(Point* self) {\n\treturn self->x + self->y;\n}\n"));
        assert!(c.contains("int Point__sum(Point* self);\n"));
    }

    #[test]
    fn test_generated_to_string() {
        let c = to_c("struct Square {\n w: Int\n}\n").unwrap();
        assert!(c.contains("String* Square__toString(Square* self) {\n\treturn String__make(\"Square\");\n}\n"));
    }

    #[test]
    fn test_user_to_string_replaces_generated_one() {
        let c = to_c("struct Person {\n name: String\n fn toString() String {\n return self.name\n }\n}\n").unwrap();
        assert!(c.contains("String* Person__toString(Person* self) {\n\treturn self->name;\n}\n"));
        assert_eq!(c.matches("String* Person__toString(Person* self) {").count(), 1);
    }

    #[test]
    fn test_struct_fields_of_struct_type() {
        let c = to_c("struct Person {\n name: String\n friend: Person\n tags: IntArray\n}\n").unwrap();
        assert!(c.contains("struct _Person {\n\tString* name;\n\tPerson* friend;\n\tIntArray* tags;\n};\n"));
    }

    #[test]
    fn test_method_params_follow_self() {
        let c = to_c("struct Sq {\n w: Int\n fn scale(by: Int, extra: Int) Int {\n return self.w * by + extra\n }\n}\n").unwrap();
        assert!(c.contains("int Sq__scale(Sq* self, int by, int extra) {\n"));
    }

    #[test]
    fn test_declarations_keep_source_order() {
        let c = to_c("fn b() {\n}\nstruct A {\n}\nfn c() {\n}\n").unwrap();
        let b = c.find("void b() {").unwrap();
        let a = c.find("A* A__make() {").unwrap();
        let cc = c.find("void c() {").unwrap();
        assert!(b < a && a < cc);
    }

    #[test]
    fn test_forward_struct_use() {
        let c = to_c("fn main() {\n var p: Point = Point()\n p.x = 1\n println(p.x)\n}\nstruct Point {\n x: Int\n}\n").unwrap();
        assert_eq!(
            body_of(&c, "main"),
            vec![
                "Point* p = Point__make();",
                "p->x = 1;",
                "printf(\"%d\\n\", p->x);",
                "return 0;",
            ]
        );
        // The struct body precedes main so field access compiles
        assert!(c.find("struct _Point {").unwrap() < c.find("int main() {").unwrap());
    }

    #[test]
    fn test_unknown_param_type() {
        let err = to_c("fn f(x: Float) {\n}\n").unwrap_err();
        assert_eq!(err.kind, GenerateErrorKind::UnknownType);
        assert_eq!((err.line, err.column), (1, 6));
    }

    #[test]
    fn test_self_cannot_be_redeclared() {
        let err = to_c("struct P {\n fn f(self: Int) {\n }\n}\n").unwrap_err();
        assert_eq!(err.kind, GenerateErrorKind::Redeclaration);
    }
}
