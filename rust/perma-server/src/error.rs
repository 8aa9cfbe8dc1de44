use perma_storage::PermaStorageError;
use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum PermaServerError {
    /// The server configuration is missing something or is malformed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An error from the listening socket or the file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the blob store the server reads from
    #[error("Blob store error: {0}")]
    Storage(#[from] PermaStorageError),
}
