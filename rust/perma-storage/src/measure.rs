use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{BlobFetcher, FetchedBlob, PermaStorageError, Reference};

/// A [MeasuredFetcher] acts as a proxy over a [BlobFetcher] implementation
/// that counts fetches and remembers the order in which references were
/// requested.
#[derive(Clone)]
pub struct MeasuredFetcher<Fetcher>
where
    Fetcher: BlobFetcher,
{
    fetches: Arc<AtomicUsize>,
    history: Arc<Mutex<Vec<Reference>>>,
    fetcher: Fetcher,
}

impl<Fetcher> MeasuredFetcher<Fetcher>
where
    Fetcher: BlobFetcher,
{
    /// Wrap the provided [BlobFetcher] so that fetches from it may be
    /// measured.
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetches: Arc::new(AtomicUsize::default()),
            history: Arc::new(Mutex::new(Vec::new())),
            fetcher,
        }
    }

    /// The aggregate number of fetches from the wrapped [BlobFetcher],
    /// successful or not
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Every fetched reference, in the order it was requested
    pub fn history(&self) -> Vec<Reference> {
        self.history.lock().clone()
    }

    /// The wrapped [BlobFetcher]
    pub fn inner(&self) -> &Fetcher {
        &self.fetcher
    }
}

#[async_trait]
impl<Fetcher> BlobFetcher for MeasuredFetcher<Fetcher>
where
    Fetcher: BlobFetcher,
{
    async fn fetch(&self, reference: &Reference) -> Result<FetchedBlob, PermaStorageError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.history.lock().push(reference.clone());
        self.fetcher.fetch(reference).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use bytes::Bytes;

    use super::*;
    use crate::{BlobReceiver, MemoryBlobStore};

    #[tokio::test]
    async fn it_counts_fetches_in_order() -> Result<()> {
        let store = MemoryBlobStore::default();
        let first = store.receive(Bytes::from_static(b"first")).await?;
        let second = store.receive(Bytes::from_static(b"second")).await?;
        let missing = Reference::of(b"missing");

        let measured = MeasuredFetcher::new(store);

        measured.fetch(&second).await?;
        measured.fetch(&first).await?;
        assert!(measured.fetch(&missing).await.is_err());

        assert_eq!(measured.fetches(), 3);
        assert_eq!(measured.history(), vec![second.clone(), first, missing]);
        assert!(measured.inner().contains(&second).await);

        Ok(())
    }
}
