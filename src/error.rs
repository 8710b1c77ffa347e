use std::fmt;

use thiserror::Error;

use crate::interpreter::RuntimeError;
use crate::lexer::LexError;
use crate::parser::SyntaxError;
use crate::semantic::SemanticError;

/// Pipeline stage an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lexical => "Lexical",
            Phase::Syntax => "Syntax",
            Phase::Semantic => "Semantic",
            Phase::Runtime => "Runtime",
        };
        f.write_str(name)
    }
}

/// First failure of a run, tagged by the stage that raised it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn phase(&self) -> Phase {
        match self {
            Error::Lex(_) => Phase::Lexical,
            Error::Syntax(_) => Phase::Syntax,
            Error::Semantic(_) => Phase::Semantic,
            Error::Runtime(_) => Phase::Runtime,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lex(error) => Some(error.line()),
            Error::Syntax(error) => Some(error.line()),
            Error::Semantic(error) => Some(error.line()),
            Error::Runtime(error) => error.line(),
        }
    }

    /// Renders `<Phase> Error: <message>`, followed by the offending source
    /// line when one is known.
    pub fn report(&self, source: &str) -> String {
        let mut report = format!("{} Error: {self}", self.phase());
        let near = self
            .line()
            .and_then(|line| line.checked_sub(1))
            .and_then(|index| source.lines().nth(index));
        if let Some(text) = near {
            report.push_str("\nNear: ");
            report.push_str(text.trim());
        }
        report
    }
}
