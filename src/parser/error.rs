use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Grammar violation; the first one aborts the parse.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message} Found {} at line {}", describe(.token), line_of(.token))]
pub struct SyntaxError {
    pub message: String,
    pub token: Token,
}

impl SyntaxError {
    pub(super) fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            token: token.clone(),
        }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::EOF => "end of input".to_string(),
        _ => format!("'{}'", token.text),
    }
}

fn line_of(token: &Token) -> usize {
    token.line
}

pub type ParseResult<T> = Result<T, SyntaxError>;
