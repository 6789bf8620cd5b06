use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by store and storage operations.
///
/// None of these are fatal: validation and not-found failures leave the
/// store untouched, and persistence failures leave the in-memory state
/// authoritative.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any state change.
    #[error("{0}")]
    Validation(String),

    /// Operation targeted an id the store does not hold.
    #[error("no task with id {0}")]
    NotFound(Uuid),

    /// Durable storage could not be read or written.
    #[error("storage failure: {0}")]
    Persistence(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
