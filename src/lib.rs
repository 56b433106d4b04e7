//! Tern: a small statically typed language compiled to C
//!
//! Pipeline: [`lexer`] -> [`parser`] -> [`codegen`], then [`toolchain`] hands
//! the C unit and the [`runtime`] to a native compiler.

pub mod ast;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod runtime;
pub mod toolchain;

pub use error::CompileError;

use ast::Program;
use limits::CompilerLimits;

/// Lex and parse a source file
pub fn parse_source(source: &str, limits: &CompilerLimits) -> Result<Program, CompileError> {
    let tokens = lexer::lex_with_limits(source, limits)?;
    Ok(parser::parse(&tokens, limits.clone())?)
}

/// Compile a source file to a C translation unit
pub fn compile_to_c(source: &str, limits: &CompilerLimits) -> Result<String, CompileError> {
    let program = parse_source(source, limits)?;
    Ok(codegen::generate(&program)?)
}
