#![warn(missing_docs)]

//! Verification of share capability chains.
//!
//! An anonymous caller asks for a blob and presents a [FetchChain]: the
//! references of zero or more "via" blobs followed by the blob it wants. The
//! first element must be a share descriptor granting access to the second;
//! every later element must be referenced by the one before it. The
//! [ChainVerifier] walks the chain hop by hop:
//!
//! - **root** (index 0): fetched, rejected if larger than
//!   [MAX_SCHEMA_BLOB_SIZE](perma_schema::MAX_SCHEMA_BLOB_SIZE), decoded as a
//!   share, rejected if expired, if its target is not the next hop, or if the
//!   chain is longer than two hops and the share is not transitive.
//! - **interior** hops: fetched, and the first
//!   [MAX_SCHEMA_BLOB_SIZE](perma_schema::MAX_SCHEMA_BLOB_SIZE) bytes must
//!   contain the canonical text of the next reference.
//! - **leaf**: already vouched for by the hop before it.
//!
//! The walk stops at the first failure; later hops are never fetched.
//!
//! Failures carry a detailed [DenialReason] for operators, but callers only
//! ever learn [VerificationOutcome::Denied]. The [ShareGate] puts the
//! verifier, the [dispatch] rules and the [DenialFloor] timing policy behind
//! one entry point with a single denial exit, so that every denial takes at
//! least the same wall-clock time.

mod chain;
pub use chain::*;

mod error;
pub use error::*;

mod verify;
pub use verify::*;

mod dispatch;
pub use dispatch::*;

mod floor;
pub use floor::*;

mod gate;
pub use gate::*;

#[cfg(test)]
mod helpers;
