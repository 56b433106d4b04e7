//! Native toolchain driver
//!
//! Turns a generated C unit into an executable by handing it, together with
//! the runtime sources, to an external C compiler.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

use crate::runtime;

const DEFAULT_CC: &str = "clang";
const UNIT_NAME: &str = "out.c";

#[derive(Debug, Clone, PartialEq)]
pub struct ToolchainConfig {
    /// Compiler executable, looked up on PATH
    pub cc: String,
    /// Extra arguments passed before the sources
    pub flags: Vec<String>,
    /// Leave the scratch directory in place after building
    pub keep_build_dir: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cc: DEFAULT_CC.to_string(),
            flags: Vec::new(),
            keep_build_dir: false,
        }
    }
}

/// `[toolchain]` table of project.toml
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ToolchainTable {
    cc: Option<String>,
    flags: Option<Vec<String>>,
    keep_build_dir: Option<bool>,
}

impl ToolchainConfig {
    pub(crate) fn apply(&mut self, table: ToolchainTable) {
        if let Some(cc) = table.cc {
            self.cc = cc;
        }
        if let Some(flags) = table.flags {
            self.flags = flags;
        }
        if let Some(keep) = table.keep_build_dir {
            self.keep_build_dir = keep;
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("C compiler `{0}` not found in PATH")]
    NotFound(String),

    #[error("I/O error while building: {0}")]
    Io(#[from] io::Error),

    #[error("C compiler exited with {status}")]
    Failed { status: ExitStatus, diagnostics: String },
}

pub struct Toolchain {
    config: ToolchainConfig,
    verbose: bool,
}

impl Toolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Compile `c_source` and the runtime into the executable at `output`
    pub fn build(&self, c_source: &str, output: &Path) -> Result<(), ToolchainError> {
        let dir = scratch_dir();
        fs::create_dir_all(&dir)?;

        let result = self.build_in(&dir, c_source, output);

        if self.config.keep_build_dir {
            if self.verbose {
                eprintln!("Build directory kept at {}", dir.display());
            }
        } else {
            let _ = fs::remove_dir_all(&dir);
        }

        result
    }

    fn build_in(&self, dir: &Path, c_source: &str, output: &Path) -> Result<(), ToolchainError> {
        let unit = dir.join(UNIT_NAME);
        fs::write(&unit, c_source)?;
        let runtime_sources = runtime::write_to(dir)?;

        let mut command = self.command(dir, &unit, &runtime_sources, output);
        if self.verbose {
            eprintln!("Running {:?}", command);
        }

        let result = command.output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ToolchainError::NotFound(self.config.cc.clone())
            } else {
                ToolchainError::Io(e)
            }
        })?;

        let diagnostics = String::from_utf8_lossy(&result.stderr).into_owned();
        if !diagnostics.trim().is_empty() {
            eprintln!("--COMPILATION--");
            eprint!("{}", diagnostics);
        }

        if !result.status.success() {
            return Err(ToolchainError::Failed {
                status: result.status,
                diagnostics,
            });
        }

        Ok(())
    }

    fn command(&self, dir: &Path, unit: &Path, runtime_sources: &[PathBuf], output: &Path) -> Command {
        let mut command = Command::new(&self.config.cc);
        command
            .args(&self.config.flags)
            .arg("-I")
            .arg(dir)
            .arg(unit)
            .args(runtime_sources)
            .arg("-o")
            .arg(output);
        command
    }
}

/// Fresh directory under the system temp dir, unique per process and call
fn scratch_dir() -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("tern-build-{}-{}", std::process::id(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolchainConfig::default();
        assert_eq!(config.cc, "clang");
        assert!(config.flags.is_empty());
        assert!(!config.keep_build_dir);
    }

    #[test]
    fn test_apply_overrides_only_present_values() {
        let mut config = ToolchainConfig::default();
        config.apply(ToolchainTable {
            flags: Some(vec!["-O2".to_string()]),
            ..Default::default()
        });
        assert_eq!(config.cc, "clang");
        assert_eq!(config.flags, vec!["-O2"]);
    }

    #[test]
    fn test_command_line_layout() {
        let toolchain = Toolchain::new(ToolchainConfig {
            cc: "gcc".to_string(),
            flags: vec!["-g".to_string()],
            keep_build_dir: false,
        });
        let dir = Path::new("/tmp/build");
        let command = toolchain.command(
            dir,
            &dir.join("out.c"),
            &[dir.join("string.c"), dir.join("array.c")],
            Path::new("prog"),
        );

        assert_eq!(command.get_program(), "gcc");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-g",
                "-I",
                "/tmp/build",
                "/tmp/build/out.c",
                "/tmp/build/string.c",
                "/tmp/build/array.c",
                "-o",
                "prog",
            ]
        );
    }

    #[test]
    fn test_scratch_dirs_are_unique() {
        assert_ne!(scratch_dir(), scratch_dir());
    }

    #[test]
    fn test_missing_compiler_is_reported() {
        let toolchain = Toolchain::new(ToolchainConfig {
            cc: "tern-no-such-compiler".to_string(),
            ..Default::default()
        });
        let output = std::env::temp_dir().join("tern-never-built");
        let err = toolchain.build("int main() { return 0; }\n", &output).unwrap_err();
        assert!(matches!(err, ToolchainError::NotFound(ref cc) if cc == "tern-no-such-compiler"));
    }
}
