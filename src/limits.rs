// Compiler safety limits
//
// Bounds the work the lexer and parser do on a single source file:
// input size, token count, identifier/string/comment length and
// expression nesting depth (the parser is recursive).
//
// Defaults can be overridden in the [limits] table of project.toml,
// see crate::config.

use serde::Deserialize;

/// Compiler safety limits with permissive defaults
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerLimits {
    // Lexer limits
    pub max_input_size: usize,        // Maximum source file size in bytes
    pub max_token_count: usize,       // Maximum number of tokens per file
    pub max_identifier_length: usize, // Maximum identifier length in bytes
    pub max_string_length: usize,     // Maximum string literal length in bytes (quotes included)
    pub max_comment_length: usize,    // Maximum comment length in bytes

    // Parser limits
    pub max_expr_depth: usize, // Maximum expression recursion depth
}

impl Default for CompilerLimits {
    fn default() -> Self {
        Self {
            max_input_size: 10_000_000,    // 10 MB
            max_token_count: 100_000,      // 100k tokens
            max_identifier_length: 1_000,  // 1k bytes
            max_string_length: 10_000_000, // 10 MB
            max_comment_length: 100_000,   // 100k bytes
            max_expr_depth: 256,
        }
    }
}

impl CompilerLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the values present in a `[limits]` table, keeping defaults for the rest
    pub(crate) fn apply(&mut self, table: &LimitsTable) {
        let overrides = [
            (&mut self.max_input_size, table.max_input_size),
            (&mut self.max_token_count, table.max_token_count),
            (&mut self.max_identifier_length, table.max_identifier_length),
            (&mut self.max_string_length, table.max_string_length),
            (&mut self.max_comment_length, table.max_comment_length),
            (&mut self.max_expr_depth, table.max_expr_depth),
        ];
        for (slot, value) in overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }

    /// Validate that all limits are positive and not absurdly large
    pub fn validate(&self) -> Result<(), LimitError> {
        const MAX_REASONABLE: usize = 100_000_000; // 100 MB

        let checks = [
            ("max_input_size", self.max_input_size, MAX_REASONABLE),
            ("max_token_count", self.max_token_count, usize::MAX),
            ("max_identifier_length", self.max_identifier_length, 100_000),
            ("max_string_length", self.max_string_length, MAX_REASONABLE),
            ("max_comment_length", self.max_comment_length, MAX_REASONABLE),
            ("max_expr_depth", self.max_expr_depth, 10_000),
        ];

        for (name, value, upper) in checks {
            if value == 0 || value > upper {
                return Err(LimitError::invalid(name, value));
            }
        }

        Ok(())
    }
}

/// `[limits]` table of project.toml
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LimitsTable {
    max_input_size: Option<usize>,
    max_token_count: Option<usize>,
    max_identifier_length: Option<usize>,
    max_string_length: Option<usize>,
    max_comment_length: Option<usize>,
    max_expr_depth: Option<usize>,
}

/// Error type for limit validation
#[derive(Debug, Clone)]
pub struct LimitError {
    pub message: String,
}

impl LimitError {
    fn invalid(name: &str, value: usize) -> Self {
        Self {
            message: format!(
                "Invalid limit '{}': {} (must be positive and reasonable)",
                name, value
            ),
        }
    }
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Limit error: {}", self.message)
    }
}

impl std::error::Error for LimitError {}
