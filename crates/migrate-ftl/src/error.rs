//! Error type for Fluent parsing.

use thiserror::Error;

/// A syntax error at a character offset of the parsed source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    /// Human-readable reason.
    pub message: String,
    /// Character offset into the source, after line-ending normalization.
    pub offset: usize,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}
