//! Error types for imagestore.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Existence errors
    #[error("Object not found: {0}")]
    NotFound(String),

    // Registry errors
    #[error("Duplicate container: {0}")]
    DuplicateContainer(String),

    #[error("Invalid container name: {0:?}")]
    InvalidContainerName(String),

    // Cache errors
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid cache metadata: {0}")]
    InvalidMetadata(String),

    // Store errors
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: String, millis: u64 },

    // Infrastructure errors
    #[error("Configuration error: {0}")]
    Config(String),

}

impl Error {
    /// Whether this error only signals that an object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
