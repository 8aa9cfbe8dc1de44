use perma_storage::Reference;
use thiserror::Error;

use crate::MAX_SCHEMA_BLOB_SIZE;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum PermaSchemaError {
    /// The blob holds more bytes than a schema blob may
    #[error("Schema blob exceeds {MAX_SCHEMA_BLOB_SIZE} bytes")]
    TooLarge,

    /// Reading the blob's bytes failed part way
    #[error("Failed to read a schema blob: {0}")]
    Read(String),

    /// The bytes read do not hash to the reference they were fetched by
    #[error("Blob contents do not match {0}")]
    Verification(Reference),

    /// The bytes are not a JSON schema envelope
    #[error("Failed to decode a schema blob: {0}")]
    DecodeFailed(String),

    /// The envelope names a schema version this crate does not understand
    #[error("Unsupported schema version {0}")]
    UnsupportedVersion(u64),

    /// A descriptor could not be encoded
    #[error("Failed to encode a schema blob: {0}")]
    EncodeFailed(String),
}
