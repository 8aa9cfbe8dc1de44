use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};

use crate::{PermaStorageError, Reference};

/// A readable stream over the bytes of one blob, together with the blob's
/// size as reported by the store.
///
/// Dropping a [FetchedBlob] releases whatever the store opened to produce it
/// (a file handle, a buffer), so holding one in a scope is all that is needed
/// to guarantee release on every exit path.
pub struct FetchedBlob {
    reader: Pin<Box<dyn AsyncRead + Send>>,
    size: u64,
}

impl FetchedBlob {
    /// Wrap a reader yielding `size` bytes.
    pub fn new<R>(reader: R, size: u64) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            reader: Box::pin(reader),
            size,
        }
    }

    /// The size of the blob, as reported by the store before any bytes are
    /// read.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl AsyncRead for FetchedBlob {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.get_mut().reader.as_mut().poll_read(cx, buf)
    }
}

impl std::fmt::Debug for FetchedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedBlob")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A [BlobFetcher] retrieves blobs by [Reference] as streams.
///
/// Implementations must be safe to share between concurrently served
/// requests.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    /// Open the blob named by `reference`, failing with
    /// [PermaStorageError::NotFound] if the store does not hold it.
    async fn fetch(&self, reference: &Reference) -> Result<FetchedBlob, PermaStorageError>;
}

/// A [BlobReceiver] stores blobs under their content-derived [Reference].
#[async_trait]
pub trait BlobReceiver: Send + Sync {
    /// Store `bytes` and return the [Reference] they may be fetched by.
    async fn receive(&self, bytes: Bytes) -> Result<Reference, PermaStorageError>;
}

#[async_trait]
impl<T> BlobFetcher for Arc<T>
where
    T: BlobFetcher + ?Sized,
{
    async fn fetch(&self, reference: &Reference) -> Result<FetchedBlob, PermaStorageError> {
        self.as_ref().fetch(reference).await
    }
}

#[async_trait]
impl<T> BlobReceiver for Arc<T>
where
    T: BlobReceiver + ?Sized,
{
    async fn receive(&self, bytes: Bytes) -> Result<Reference, PermaStorageError> {
        self.as_ref().receive(bytes).await
    }
}
