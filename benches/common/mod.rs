#![allow(dead_code)]
use std::fs;
use std::path::Path;

use cinterp::ast::Program;
use cinterp::{lexer, parser, semantic};

/// Fixture programs whose case.yaml enables benchmarking, as (label, path).
pub fn workloads() -> Vec<(String, String)> {
    test_support::load_cases(Path::new("tests/programs"))
        .expect("load fixture cases")
        .into_iter()
        .filter(|case| case.is_benchmarked())
        .map(|case| (case.name, case.program_path.display().to_string()))
        .collect()
}

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_program(path: &str) -> Program {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source).unwrap_or_else(|err| panic!("tokenize {path}: {err}"));
    let mut program =
        parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {path}: {err}"));
    semantic::analyze(&mut program).unwrap_or_else(|err| panic!("analyze {path}: {err}"));
    program
}
