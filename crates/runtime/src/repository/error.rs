//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by collision map repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("collision repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(error: serde_json::Error) -> Self {
        RepositoryError::Json(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
