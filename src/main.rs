//! CLI entry point: `tplverify <path-to-file>`. Exits 0 iff every
//! function in the file verifies, nonzero on any invalid path or
//! structural error.

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process::ExitCode;
use tplverify::ast::Program;
use tplverify::orchestrator::verify_source;

/// Deductive verifier for annotated integer/boolean programs.
#[derive(ClapParser, Debug)]
#[command(name = "tplverify", version, about)]
struct Cli {
    /// Path to a `.tpl` source file.
    path: PathBuf,

    /// Print the verification condition checked at every basic path.
    #[arg(short, long)]
    verbose: bool,

    /// Print the parsed, checked AST as JSON instead of verifying.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let extension = cli.path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension != "tpl" {
        bail!("'{}': expected a .tpl source file", cli.path.display());
    }

    let source = std::fs::read_to_string(&cli.path)
        .with_context(|| format!("reading '{}'", cli.path.display()))?;
    let file = cli.path.display().to_string();

    if cli.dump_ast {
        return dump_ast(&source, &file);
    }

    let verdict = verify_source(&source, &file, cli.verbose)?;
    for function in &verdict.functions {
        let status = if function.is_valid() { "Valid" } else { "Invalid" };
        println!("{}: {status} ({} path(s))", function.name, function.paths.len());
    }
    Ok(verdict.is_valid())
}

fn dump_ast(source: &str, file: &str) -> Result<bool> {
    let mut program: Program = tplverify::parser::parse_program(source, file)?;
    tplverify::checker::check_program(&mut program)?;
    let json = serde_json::to_string_pretty(&program).context("serializing AST")?;
    println!("{json}");
    Ok(true)
}
