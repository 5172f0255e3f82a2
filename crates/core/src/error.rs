//! Error types for s3search
//!
//! Each variant maps onto a distinct exit code in the CLI.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while searching object storage
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport or service failure after the retry policy gave up
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials missing, expired or rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The named bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether this error means the addressed resource is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BucketNotFound(_) | Error::NotFound(_))
    }
}
