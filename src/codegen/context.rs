use std::collections::HashMap;

use super::error::{GenerateError, GenerateErrorKind};
use super::types::ResolvedType;
use super::{TEMP_PREFIX, reserved_name_error};
use crate::ast::{Declaration, Function, Position, Program};

/// Every struct gets a `toString`; one is generated when the source has none
pub const TO_STRING: &str = "toString";

/// Method suffix taken by the constructor, `<Struct>__make`
pub const CONSTRUCTOR: &str = "make";

#[derive(Debug, Clone, PartialEq)]
pub struct StructInfo {
    pub name: String,
    pub fields: Vec<(String, ResolvedType)>,
    /// Method name -> return type, including a generated `toString`
    pub methods: HashMap<String, ResolvedType>,
    pub has_user_to_string: bool,
}

impl StructInfo {
    pub fn field_type(&self, field: &str) -> Option<&ResolvedType> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty)
    }

    pub fn method_return_type(&self, method: &str) -> Option<&ResolvedType> {
        self.methods.get(method)
    }
}

/// Shapes of all declarations in a program, collected before any lowering.
///
/// Because the whole program is scanned up front, a function may use a
/// struct (or call a function) declared further down the file.
#[derive(Debug, Clone, Default)]
pub struct CompilationContext {
    structs: HashMap<String, StructInfo>,
    struct_order: Vec<String>,
    functions: HashMap<String, ResolvedType>,
}

impl CompilationContext {
    pub fn from_program(program: &Program) -> Result<Self, GenerateError> {
        let mut context = Self::default();

        // Names first so field and signature types can refer to any struct
        for decl in &program.declarations {
            if let Declaration::Struct(st) = decl {
                if context.structs.contains_key(&st.name) {
                    return Err(duplicate("struct", &st.name, st.pos));
                }
                context.structs.insert(
                    st.name.clone(),
                    StructInfo {
                        name: st.name.clone(),
                        fields: Vec::new(),
                        methods: HashMap::new(),
                        has_user_to_string: false,
                    },
                );
                context.struct_order.push(st.name.clone());
            }
        }

        for decl in &program.declarations {
            match decl {
                Declaration::Struct(st) => {
                    let mut fields: Vec<(String, ResolvedType)> = Vec::new();
                    for prop in &st.props {
                        if fields.iter().any(|(name, _)| *name == prop.name) {
                            return Err(duplicate("field", &prop.name, prop.pos));
                        }
                        fields.push((prop.name.clone(), context.resolve_type(&prop.type_name, prop.pos)?));
                    }

                    let mut methods = HashMap::new();
                    for method in &st.methods {
                        if method.name == CONSTRUCTOR {
                            return Err(GenerateError::new(
                                GenerateErrorKind::Redeclaration,
                                format!("Method name {} is taken by the constructor of {}", CONSTRUCTOR, st.name),
                                method.pos,
                            ));
                        }
                        let ret = context.return_type(method)?;
                        if method.name == TO_STRING && (!method.params.is_empty() || ret != ResolvedType::String) {
                            return Err(GenerateError::new(
                                GenerateErrorKind::Unsupported,
                                format!("{}.{} must take no parameters and return String", st.name, TO_STRING),
                                method.pos,
                            ));
                        }
                        if methods.insert(method.name.clone(), ret).is_some() {
                            return Err(duplicate("method", &method.name, method.pos));
                        }
                    }
                    let has_user_to_string = methods.contains_key(TO_STRING);
                    if !has_user_to_string {
                        methods.insert(TO_STRING.to_string(), ResolvedType::String);
                    }

                    if let Some(info) = context.structs.get_mut(&st.name) {
                        info.fields = fields;
                        info.methods = methods;
                        info.has_user_to_string = has_user_to_string;
                    }
                }
                Declaration::Function(func) => {
                    // Struct names are C type names; a function cannot share one
                    if context.is_struct(&func.name) {
                        return Err(duplicate("struct and function", &func.name, func.pos));
                    }
                    if func.name.starts_with(TEMP_PREFIX) {
                        return Err(reserved_name_error(&func.name, func.pos));
                    }
                    let ret = context.return_type(func)?;
                    if context.functions.insert(func.name.clone(), ret).is_some() {
                        return Err(duplicate("function", &func.name, func.pos));
                    }
                }
            }
        }

        Ok(context)
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn struct_info(&self, name: &str) -> Option<&StructInfo> {
        self.structs.get(name)
    }

    /// Structs in declaration order
    pub fn structs(&self) -> impl Iterator<Item = &StructInfo> {
        self.struct_order.iter().filter_map(|name| self.structs.get(name))
    }

    pub fn function_return_type(&self, name: &str) -> Option<&ResolvedType> {
        self.functions.get(name)
    }

    /// Resolve a source type name
    pub fn resolve_type(&self, type_name: &str, pos: Position) -> Result<ResolvedType, GenerateError> {
        match type_name {
            "Int" => Ok(ResolvedType::Int),
            "String" => Ok(ResolvedType::String),
            "IntArray" => Ok(ResolvedType::IntArray),
            name if self.is_struct(name) => Ok(ResolvedType::Struct(name.to_string())),
            name => Err(GenerateError::new(
                GenerateErrorKind::UnknownType,
                format!("Unknown type: {}", name),
                pos,
            )),
        }
    }

    pub fn return_type(&self, func: &Function) -> Result<ResolvedType, GenerateError> {
        match &func.return_type {
            Some(name) => self.resolve_type(name, func.pos),
            None => Ok(ResolvedType::Void),
        }
    }
}

fn duplicate(what: &str, name: &str, pos: Position) -> GenerateError {
    GenerateError::new(
        GenerateErrorKind::Redeclaration,
        format!("Duplicate {} declaration: {}", what, name),
        pos,
    )
}
