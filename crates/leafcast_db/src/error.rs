//! Error types for the database client

use leafcast_common::LeafcastError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx, passed through unchanged
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// A device failed domain validation (on write, or on a point read)
    #[error("Invalid device: {0}")]
    ValidationError(#[from] LeafcastError),

    /// A single-target delete matched no row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),
}

impl DbError {
    /// Whether the driver rejected the statement because of a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::SqlxError(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// Whether this is the "no row removed" outcome of a single-target delete
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}
