use std::collections::HashMap;

use super::types::ResolvedType;

/// Names visible inside one function body.
///
/// There is a single flat scope per function: parameters (and `self` for
/// methods) are declared first, then each `var` in order. Nothing is ever
/// removed; the table is dropped when the function is done.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, ResolvedType>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and leaves the table untouched) if the name is already declared
    pub fn declare(&mut self, name: &str, ty: ResolvedType) -> bool {
        if self.symbols.contains_key(name) {
            return false;
        }
        self.symbols.insert(name.to_string(), ty);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&ResolvedType> {
        self.symbols.get(name)
    }
}
