use bytes::Bytes;
use perma_storage::Reference;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{MAX_SCHEMA_BLOB_SIZE, PermaSchemaError, SCHEMA_VERSION};

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "camliVersion")]
    version: u64,
    #[serde(rename = "camliType")]
    kind: String,
}

/// A decoded schema blob.
///
/// A [Blob] only asserts that the bytes are a well formed schema envelope.
/// Whether it describes something useful is decided by the typed views,
/// [Blob::as_share] and [Blob::as_file].
#[derive(Debug, Clone)]
pub struct Blob {
    reference: Reference,
    kind: String,
    bytes: Bytes,
    value: Value,
}

impl Blob {
    /// Read and decode the schema blob named by `reference` from `reader`.
    ///
    /// At most [MAX_SCHEMA_BLOB_SIZE] bytes are accepted; a reader that yields
    /// more is rejected rather than truncated. The bytes must hash to
    /// `reference`.
    pub async fn from_reader<R>(reference: &Reference, reader: R) -> Result<Self, PermaSchemaError>
    where
        R: AsyncRead + Unpin,
    {
        let mut bytes = Vec::new();
        reader
            .take(MAX_SCHEMA_BLOB_SIZE + 1)
            .read_to_end(&mut bytes)
            .await
            .map_err(|error| PermaSchemaError::Read(format!("{error}")))?;

        if bytes.len() as u64 > MAX_SCHEMA_BLOB_SIZE {
            return Err(PermaSchemaError::TooLarge);
        }

        Self::from_bytes(reference, Bytes::from(bytes))
    }

    /// Decode the schema blob named by `reference` from bytes already in
    /// memory.
    pub fn from_bytes(reference: &Reference, bytes: Bytes) -> Result<Self, PermaSchemaError> {
        if bytes.len() as u64 > MAX_SCHEMA_BLOB_SIZE {
            return Err(PermaSchemaError::TooLarge);
        }

        if !reference.verifies(&bytes) {
            return Err(PermaSchemaError::Verification(reference.clone()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|error| PermaSchemaError::DecodeFailed(format!("{error}")))?;
        let envelope = Envelope::deserialize(&value)
            .map_err(|error| PermaSchemaError::DecodeFailed(format!("{error}")))?;

        if envelope.version != SCHEMA_VERSION {
            return Err(PermaSchemaError::UnsupportedVersion(envelope.version));
        }

        Ok(Blob {
            reference: reference.clone(),
            kind: envelope.kind,
            bytes,
            value,
        })
    }

    /// The reference this blob was decoded from.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// The `camliType` of the blob, e.g. `"share"` or `"file"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The raw bytes of the blob.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub(crate) fn fields<T>(&self, kind: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if self.kind != kind {
            return None;
        }

        T::deserialize(&self.value).ok()
    }
}
