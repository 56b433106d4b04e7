use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use tern_lang::cli::{Cli, Commands};
use tern_lang::config::ProjectConfig;
use tern_lang::toolchain::Toolchain;
use tern_lang::{CompileError, codegen, lexer, parse_source};

fn main() {
    let cli = Cli::parse();

    let file = match &cli.command {
        Commands::Lex(args) | Commands::Parse(args) | Commands::Run(args) => &args.file,
        Commands::Emit(args) | Commands::Build(args) => &args.file,
    };
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", file.display(), e);
            process::exit(1);
        }
    };

    match run(&cli, &source) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e.display(&source));
            process::exit(1);
        }
    }
}

/// Execute the subcommand; returns the process exit code
fn run(cli: &Cli, source: &str) -> Result<i32, CompileError> {
    let config = ProjectConfig::from_project_toml(&cli.project)?;
    let log = |stage: &str| {
        if cli.verbose {
            eprintln!("[tern] {}", stage);
        }
    };

    match &cli.command {
        Commands::Lex(_) => {
            log("lexing");
            for token in lexer::lex_with_limits(source, &config.limits)? {
                println!("{}", token);
            }
        }
        Commands::Parse(_) => {
            log("parsing");
            let program = parse_source(source, &config.limits)?;
            print!("{}", program.to_tree_string());
        }
        Commands::Emit(args) => {
            let c = emit(source, &config, &log)?;
            match &args.output {
                Some(path) => {
                    fs::write(path, c)?;
                    log(&format!("wrote {}", path.display()));
                }
                None => print!("{}", c),
            }
        }
        Commands::Build(args) => {
            let output = args.output.clone().unwrap_or_else(|| default_output(&args.file));
            build(source, &config, &output, cli.verbose, &log)?;
        }
        Commands::Run(args) => {
            let output = std::env::temp_dir().join(format!("tern-run-{}", process::id()));
            build(source, &config, &output, cli.verbose, &log)?;

            log(&format!("running {}", args.file.display()));
            let status = Command::new(&output).status();
            let _ = fs::remove_file(&output);
            return Ok(status?.code().unwrap_or(1));
        }
    }

    Ok(0)
}

fn emit(source: &str, config: &ProjectConfig, log: &dyn Fn(&str)) -> Result<String, CompileError> {
    log("parsing");
    let program = parse_source(source, &config.limits)?;
    log("generating C");
    Ok(codegen::generate(&program)?)
}

fn build(
    source: &str,
    config: &ProjectConfig,
    output: &Path,
    verbose: bool,
    log: &dyn Fn(&str),
) -> Result<(), CompileError> {
    let c = emit(source, config, log)?;
    log(&format!("compiling with {}", config.toolchain.cc));
    Toolchain::new(config.toolchain.clone())
        .verbose(verbose)
        .build(&c, output)?;
    Ok(())
}

/// `prog.tern` builds to `prog`
fn default_output(file: &Path) -> PathBuf {
    let stem = file.file_stem().unwrap_or(file.as_os_str());
    PathBuf::from(stem)
}
