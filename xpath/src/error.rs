//! Parse error types.

use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while lexing or parsing an expression.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("Unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Malformed number at offset {offset}")]
    MalformedNumber { offset: usize },

    #[error("Unexpected token {found} at offset {offset}: expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },

    #[error("Unexpected end of expression: expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("Trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

impl ParseError {
    pub fn unexpected_token(
        found: impl Into<String>,
        expected: impl Into<String>,
        offset: usize,
    ) -> Self {
        Self::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            offset,
        }
    }

    pub fn unexpected_end(expected: impl Into<String>) -> Self {
        Self::UnexpectedEnd {
            expected: expected.into(),
        }
    }
}
