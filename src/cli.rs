use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tern")]
#[command(about = "Tern language compiler")]
pub struct Cli {
    /// Project configuration file
    #[arg(long, global = true, default_value = "project.toml")]
    pub project: PathBuf,

    /// Report each compilation stage on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tokens of a source file
    Lex(InputArgs),
    /// Parse a source file and print the AST
    Parse(InputArgs),
    /// Print or write the generated C code
    Emit(OutputArgs),
    /// Compile a source file to an executable
    Build(OutputArgs),
    /// Compile and run a source file
    Run(InputArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Input file path
    pub file: PathBuf,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Input file path
    pub file: PathBuf,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
