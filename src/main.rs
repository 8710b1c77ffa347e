use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cinterp::{Config, Error, InputMode, lexer};
use clap::Parser;

/// Runs programs written in a small C-like language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file to run. Standard input is read when omitted.
    file: Option<PathBuf>,

    /// YAML file with run settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where `input` reads from. Overrides the config file.
    #[arg(short, long, value_enum)]
    input: Option<InputMode>,

    /// Print the token stream instead of running the program.
    #[arg(long)]
    tokens: bool,

    /// Stop after semantic analysis.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }

    let source = read_source(args.file.as_deref())?;

    let result = if args.tokens {
        lexer::tokenize(&source)
            .map(|tokens| {
                for token in tokens {
                    println!("{token}");
                }
            })
            .map_err(Error::from)
    } else if args.check {
        cinterp::check(&source).map(|_| println!("Semantic analysis completed successfully."))
    } else {
        cinterp::run(&source, &config, &mut io::stdout())
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) => {
            eprintln!("{}", error.report(&source));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            Ok(buffer)
        }
    }
}
