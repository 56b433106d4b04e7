//! Project configuration
//!
//! Everything is read from an optional `project.toml`:
//!
//! ```toml
//! [limits]
//! max_expr_depth = 128
//!
//! [toolchain]
//! cc = "clang"
//! flags = ["-O2"]
//! keep_build_dir = false
//! ```
//!
//! A missing file means defaults; a malformed one is an error.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::limits::{CompilerLimits, LimitsTable};
use crate::toolchain::{ToolchainConfig, ToolchainTable};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    pub limits: CompilerLimits,
    pub toolchain: ToolchainConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectFile {
    limits: Option<LimitsTable>,
    toolchain: Option<ToolchainTable>,
}

impl ProjectConfig {
    /// Load project.toml, falling back to defaults when the file does not exist
    pub fn from_project_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        Self::from_toml_str(&content).map_err(|e| ConfigError {
            message: format!("{}: {}", path.display(), e.message),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ProjectFile = toml::from_str(content).map_err(|e| ConfigError {
            message: format!("Failed to parse project file: {}", e),
        })?;

        let mut config = Self::default();
        if let Some(table) = &file.limits {
            config.limits.apply(table);
        }
        if let Some(table) = file.toolchain {
            config.toolchain.apply(table);
        }

        config.limits.validate().map_err(|e| ConfigError {
            message: e.to_string(),
        })?;

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ProjectConfig::from_project_toml("nonexistent-project.toml").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.toolchain.cc, "clang");
    }

    #[test]
    fn test_partial_override() {
        let config = ProjectConfig::from_toml_str(
            r#"
[limits]
max_input_size = 2000000
max_expr_depth = 128

[toolchain]
cc = "gcc"
"#,
        )
        .unwrap();

        assert_eq!(config.limits.max_input_size, 2_000_000);
        assert_eq!(config.limits.max_expr_depth, 128);
        assert_eq!(config.limits.max_token_count, 100_000);
        assert_eq!(config.toolchain.cc, "gcc");
        assert!(!config.toolchain.keep_build_dir);
    }

    #[test]
    fn test_file_round_trip_through_disk() {
        let temp_path = std::env::temp_dir().join("tern_test_project.toml");
        fs::write(&temp_path, "[toolchain]\nflags = [\"-O2\", \"-g\"]\n").unwrap();

        let config = ProjectConfig::from_project_toml(&temp_path).unwrap();
        assert_eq!(config.toolchain.flags, vec!["-O2".to_string(), "-g".to_string()]);

        let _ = fs::remove_file(temp_path);
    }

    #[test]
    fn test_malformed_toml_returns_error() {
        let result = ProjectConfig::from_toml_str("this is not valid toml {{{");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_limit_value_returns_error() {
        let err = ProjectConfig::from_toml_str("[limits]\nmax_expr_depth = 0\n").unwrap_err();
        assert!(err.message.contains("max_expr_depth"));
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        assert!(ProjectConfig::from_toml_str("[optimizer]\nlevel = 3\n").is_err());
    }
}
