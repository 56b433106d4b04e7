use std::fmt;

/// The types a lowering decision can depend on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    Int,
    String,
    IntArray,
    Struct(String),
    /// Only produced for functions without a return type
    Void,
}

impl ResolvedType {
    /// C spelling; everything except `int` and `void` lives behind a pointer
    pub fn c_type(&self) -> String {
        match self {
            ResolvedType::Int => "int".to_string(),
            ResolvedType::String => "String*".to_string(),
            ResolvedType::IntArray => "IntArray*".to_string(),
            ResolvedType::Struct(name) => format!("{}*", name),
            ResolvedType::Void => "void".to_string(),
        }
    }

    pub fn struct_name(&self) -> Option<&str> {
        match self {
            ResolvedType::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolvedType::Int => write!(f, "Int"),
            ResolvedType::String => write!(f, "String"),
            ResolvedType::IntArray => write!(f, "IntArray"),
            ResolvedType::Struct(name) => write!(f, "{}", name),
            ResolvedType::Void => write!(f, "Void"),
        }
    }
}
