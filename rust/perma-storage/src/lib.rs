#![warn(missing_docs)]

//! This crate contains the content-addressed blob storage used by the Perma
//! share server.
//!
//! Every blob is named by a [Reference] derived from its bytes. Blobs are
//! read back through a [BlobFetcher], which hands out a bounded, streaming
//! [FetchedBlob] along with the blob's size, and written through a
//! [BlobReceiver]:
//!
//! ```rust
//! # async fn example() -> Result<(), perma_storage::PermaStorageError> {
//! use perma_storage::{BlobFetcher, BlobReceiver, MemoryBlobStore};
//! use tokio::io::AsyncReadExt;
//!
//! let store = MemoryBlobStore::default();
//! let reference = store.receive("hello".into()).await?;
//!
//! let mut blob = store.fetch(&reference).await?;
//! assert_eq!(blob.size(), 5);
//!
//! let mut contents = String::new();
//! blob.read_to_string(&mut contents).await.unwrap();
//! assert_eq!(contents, "hello");
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod reference;
pub use reference::*;

mod fetch;
pub use fetch::*;

mod store;
pub use store::*;

mod measure;
pub use measure::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
