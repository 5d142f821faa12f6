//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from persistence and the transport seam so the binary can
//! bubble them up with consistent context. Planning failures are not errors
//! (they come back as `None`) and broken invariants panic.
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("transport closed")]
    TransportClosed,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("giving up after {count} errors (max {max})")]
    TooManyErrors { count: u32, max: u32 },
}
