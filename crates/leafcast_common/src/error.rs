// --- File: crates/leafcast_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for the Leafcast domain model.
///
/// Storage crates wrap this type so that a malformed subscription can be
/// told apart from a driver failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeafcastError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for LeafcastError {
    fn from(err: serde_json::Error) -> Self {
        LeafcastError::ParseError(err.to_string())
    }
}

pub fn parse_error<T: fmt::Display>(message: T) -> LeafcastError {
    LeafcastError::ParseError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> LeafcastError {
    LeafcastError::ValidationError(message.to_string())
}
