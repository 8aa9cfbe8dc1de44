use std::{collections::HashMap, io::Cursor, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{BlobFetcher, BlobReceiver, FetchedBlob, PermaStorageError, Reference};

/// A trivial blob store - backed by a [HashMap] - where all blobs are kept in
/// memory and never persisted. Clones share the same underlying entries.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    entries: Arc<RwLock<HashMap<Reference, Bytes>>>,
}

impl MemoryBlobStore {
    /// Store `bytes` under an arbitrary `reference`, without checking that the
    /// bytes hash to it. Useful for simulating a misbehaving or tampered
    /// store.
    pub async fn insert_unchecked(&self, reference: Reference, bytes: Bytes) {
        self.entries.write().await.insert(reference, bytes);
    }

    /// True if a blob is stored under `reference`.
    pub async fn contains(&self, reference: &Reference) -> bool {
        self.entries.read().await.contains_key(reference)
    }

    /// The number of stored blobs.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True if nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl BlobFetcher for MemoryBlobStore {
    async fn fetch(&self, reference: &Reference) -> Result<FetchedBlob, PermaStorageError> {
        let entries = self.entries.read().await;
        let bytes = entries
            .get(reference)
            .cloned()
            .ok_or_else(|| PermaStorageError::NotFound(reference.clone()))?;
        let size = bytes.len() as u64;

        Ok(FetchedBlob::new(Cursor::new(bytes), size))
    }
}

#[async_trait]
impl BlobReceiver for MemoryBlobStore {
    async fn receive(&self, bytes: Bytes) -> Result<Reference, PermaStorageError> {
        let reference = Reference::of(&bytes);
        self.entries.write().await.insert(reference.clone(), bytes);
        Ok(reference)
    }
}
