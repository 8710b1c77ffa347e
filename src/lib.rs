pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod semantic;
pub mod token;

use std::io::Write;

use ast::Program;
use interpreter::Interpreter;

pub use config::{Config, InputMode};
pub use error::{Error, Phase};

/// Lexes, parses and analyzes `source`, returning the type-annotated tree.
pub fn check(source: &str) -> Result<Program, Error> {
    let tokens = lexer::tokenize(source)?;
    let mut program = parser::parse_tokens(tokens)?;
    semantic::analyze(&mut program)?;
    Ok(program)
}

/// Runs the whole pipeline. Nothing is executed unless every front-end stage
/// succeeds; on a runtime error the output printed so far stays in `output`.
pub fn run<W: Write>(source: &str, config: &Config, output: &mut W) -> Result<(), Error> {
    let program = check(source)?;
    let mut interpreter = Interpreter::from_config(config, output);
    interpreter.execute(&program)?;
    Ok(())
}
