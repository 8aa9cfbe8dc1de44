use thiserror::Error;

use crate::Reference;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum PermaStorageError {
    /// The requested blob is not present in the store
    #[error("Blob not found: {0}")]
    NotFound(Reference),

    /// Reference text that does not follow the canonical grammar
    #[error("Malformed reference: {0}")]
    InvalidReference(String),

    /// An error that occurs when working with a storage backend
    #[error("Storage backend error: {0}")]
    StorageBackend(String),

    /// An error that occurs when byte hash verification fails
    #[error("Byte hash verification failed: {0}")]
    Verification(String),
}

impl From<std::io::Error> for PermaStorageError {
    fn from(error: std::io::Error) -> Self {
        PermaStorageError::StorageBackend(format!("{error}"))
    }
}
