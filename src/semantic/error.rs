use thiserror::Error;

use crate::ast::{BinaryOperator, StaticType, UnaryOperator};

/// Scope and type violations found before execution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Variable '{name}' is already declared at line {line}")]
    AlreadyDeclared { name: String, line: usize },
    #[error("Variable '{name}' is not declared at line {line}")]
    Undeclared { name: String, line: usize },
    #[error(
        "Type mismatch in initialization of variable '{name}': expected '{expected}', \
         got '{found}' at line {line}"
    )]
    InitializerMismatch {
        name: String,
        expected: StaticType,
        found: StaticType,
        line: usize,
    },
    #[error(
        "Type mismatch in assignment to variable '{name}': variable is '{expected}', \
         value is '{found}' at line {line}"
    )]
    AssignmentMismatch {
        name: String,
        expected: StaticType,
        found: StaticType,
        line: usize,
    },
    #[error("Invalid operands for comparison: '{left}' and '{right}' at line {line}")]
    ComparisonMismatch {
        left: StaticType,
        right: StaticType,
        line: usize,
    },
    #[error("Type mismatch in arithmetic operation: '{left}' and '{right}' at line {line}")]
    ArithmeticMismatch {
        left: StaticType,
        right: StaticType,
        line: usize,
    },
    #[error("Unknown operator '{operator}' in binary operation at line {line}")]
    UnknownOperator { operator: BinaryOperator, line: usize },
    #[error("Unary operator '{operator}' applied to non-numeric type '{found}' at line {line}")]
    NonNumericOperand {
        operator: UnaryOperator,
        found: StaticType,
        line: usize,
    },
    #[error("Condition in '{construct}' must be of type 'bool', got '{found}' at line {line}")]
    NonBooleanCondition {
        construct: &'static str,
        found: StaticType,
        line: usize,
    },
}

impl SemanticError {
    pub fn line(&self) -> usize {
        match self {
            SemanticError::AlreadyDeclared { line, .. }
            | SemanticError::Undeclared { line, .. }
            | SemanticError::InitializerMismatch { line, .. }
            | SemanticError::AssignmentMismatch { line, .. }
            | SemanticError::ComparisonMismatch { line, .. }
            | SemanticError::ArithmeticMismatch { line, .. }
            | SemanticError::UnknownOperator { line, .. }
            | SemanticError::NonNumericOperand { line, .. }
            | SemanticError::NonBooleanCondition { line, .. } => *line,
        }
    }
}

pub type SemanticResult<T> = Result<T, SemanticError>;
