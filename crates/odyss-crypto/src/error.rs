//! Error types for credential operations.

use thiserror::Error;

/// Credential operation errors.
///
/// Only issuing operations return these; verification paths normalize
/// failures to `false`/`None`.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// Token signing failed.
    #[error("Token signing failed: {0}")]
    Token(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for credential operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
