use thiserror::Error;

use crate::ast::BinaryOperator;

/// Typed errors produced while executing a program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}' at line {line}")]
    UndefinedVariable { name: String, line: usize },
    #[error("Expected a number, but got '{found}' at line {line}")]
    ExpectedNumber { found: String, line: usize },
    #[error("Invalid operands for operator '{operator}': {left} and {right} at line {line}")]
    InvalidOperands {
        operator: BinaryOperator,
        left: &'static str,
        right: &'static str,
        line: usize,
    },
    #[error("Unknown operator '{operator}' at line {line}")]
    UnknownOperator { operator: BinaryOperator, line: usize },
    #[error("Integer overflow in '{operator}' at line {line}")]
    IntegerOverflow { operator: BinaryOperator, line: usize },
    #[error("Return outside of function (returning {value}) at line {line}")]
    ReturnOutsideFunction { value: String, line: usize },
    #[error("Failed to read input at line {line}: {message}")]
    Input { message: String, line: usize },
    #[error("Failed to write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::ExpectedNumber { line, .. }
            | RuntimeError::InvalidOperands { line, .. }
            | RuntimeError::UnknownOperator { line, .. }
            | RuntimeError::IntegerOverflow { line, .. }
            | RuntimeError::ReturnOutsideFunction { line, .. }
            | RuntimeError::Input { line, .. } => Some(*line),
            RuntimeError::Output { .. } => None,
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
