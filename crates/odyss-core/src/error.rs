//! Error types for the Odyss notes service.

use thiserror::Error;

/// Result type alias using Odyss's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Odyss operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate identity (email, username) or other uniqueness clash
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authenticated but the operation is not allowed (vault cap, default vault)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing, malformed, or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
