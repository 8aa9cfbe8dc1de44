#![warn(missing_docs)]

//! Schema blobs are small JSON documents stored in the blob store that give
//! meaning to other blobs. Every schema blob carries a `camliVersion` (always
//! `1`) and a `camliType`:
//!
//! ```json
//! {
//!   "camliVersion": 1,
//!   "camliType": "share",
//!   "authType": "haveref",
//!   "target": "blake3-…",
//!   "transitive": true,
//!   "expires": "2031-01-01T00:00:00Z"
//! }
//! ```
//!
//! A [Blob] is decoded from a bounded reader with [Blob::from_reader] and then
//! viewed as a [Share] or a [File]. Schema blobs are never larger than
//! [MAX_SCHEMA_BLOB_SIZE].

mod error;
pub use error::*;

mod blob;
pub use blob::*;

mod share;
pub use share::*;

mod file;
pub use file::*;

/// The largest blob that will ever be decoded as a schema blob, in bytes.
pub const MAX_SCHEMA_BLOB_SIZE: u64 = 1 << 20;

/// The only schema version understood by this crate.
pub const SCHEMA_VERSION: u64 = 1;
