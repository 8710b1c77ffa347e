use std::fmt;

use crate::ast::Literal;

use super::RuntimeError;

/// Runtime value model used by the tree-walking interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Char(char),
    String(String),
    Boolean(bool),
    Null,
}

impl Value {
    /// Only `null` and `false` are falsy; `0` and `""` are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(value) => *value,
            Value::Integer(_) | Value::Float(_) | Value::Char(_) | Value::String(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Boolean(_) => "bool",
            Value::Null => "null",
        }
    }

    pub(super) fn to_f64(&self, line: usize) -> Result<f64, RuntimeError> {
        match self {
            Value::Integer(value) => Ok(*value as f64),
            Value::Float(value) => Ok(*value),
            Value::Char(_) | Value::String(_) | Value::Boolean(_) | Value::Null => {
                Err(RuntimeError::ExpectedNumber {
                    found: self.to_string(),
                    line,
                })
            }
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Integer(value) => Value::Integer(*value),
            Literal::Float(value) => Value::Float(*value),
            Literal::Char(value) => Value::Char(*value),
            Literal::String(value) => Value::String(value.clone()),
            Literal::Boolean(value) => Value::Boolean(*value),
            Literal::Null => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) if value.is_infinite() => {
                f.write_str(if value.is_sign_positive() { "Infinity" } else { "-Infinity" })
            }
            // Debug keeps a fractional digit or an exponent, so a float never reads as an int.
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Char(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_only_rejects_null_and_false() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Float(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
        assert!(Value::Char('\0').is_truthy());
    }

    #[test]
    fn renders_output_forms() {
        assert_eq!(Value::Integer(-4).to_string(), "-4");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(-0.125).to_string(), "-0.125");
        assert_eq!(Value::Float(1e16).to_string(), "1e16");
        assert_eq!(Value::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Char('q').to_string(), "q");
        assert_eq!(Value::String("plain".to_string()).to_string(), "plain");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn numeric_coercion_rejects_non_numbers() {
        assert_eq!(Value::Integer(3).to_f64(1), Ok(3.0));
        assert_eq!(Value::Float(1.5).to_f64(1), Ok(1.5));
        assert_eq!(
            Value::String("7".to_string()).to_f64(9),
            Err(RuntimeError::ExpectedNumber {
                found: "7".to_string(),
                line: 9
            })
        );
    }
}
