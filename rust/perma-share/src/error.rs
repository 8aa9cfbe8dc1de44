use chrono::{DateTime, Utc};
use perma_schema::PermaSchemaError;
use perma_storage::{PermaStorageError, Reference};
use thiserror::Error;

/// Why a share chain was refused.
///
/// This is operator-facing detail: it is written to the server log and must
/// never reach the caller, who only ever sees a generic denial.
#[derive(Error, Debug)]
pub enum DenialReason {
    /// A hop could not be fetched from the store
    #[error("Fetch chain {index} of {reference} failed: {error}")]
    Fetch {
        /// Position of the hop in the chain
        index: usize,
        /// The hop's reference
        reference: Reference,
        /// The store's error
        error: PermaStorageError,
    },

    /// The root hop is too large to be a share descriptor
    #[error("Fetch chain 0 of {reference} too large ({size} bytes)")]
    TooLarge {
        /// The root's reference
        reference: Reference,
        /// The size reported by the store
        size: u64,
    },

    /// Reading an interior hop failed part way
    #[error("Fetch chain {index} of {reference} failed in read: {error}")]
    Read {
        /// Position of the hop in the chain
        index: usize,
        /// The hop's reference
        reference: Reference,
        /// The reader's error
        error: std::io::Error,
    },

    /// The root hop is not a schema blob
    #[error("Can't decode a schema blob from {reference}: {error}")]
    Decode {
        /// The root's reference
        reference: Reference,
        /// The decoder's error
        error: PermaSchemaError,
    },

    /// The root hop is a schema blob, but not a valid share
    #[error("Fetch chain 0 of {reference} wasn't a valid share")]
    NotAShare {
        /// The root's reference
        reference: Reference,
    },

    /// The root share has expired
    #[error("Share {reference} expired at {expires}")]
    Expired {
        /// The share's reference
        reference: Reference,
        /// When it expired
        expires: DateTime<Utc>,
    },

    /// The root share grants access to something other than the second hop
    #[error(
        "Fetch chain 0->1 ({reference} -> {requested}) unauthorized, expected hop to {target}"
    )]
    TargetMismatch {
        /// The share's reference
        reference: Reference,
        /// The second hop, as requested
        requested: Reference,
        /// The share's target
        target: Reference,
    },

    /// The chain is longer than a direct share allows
    #[error("Share {reference} is not transitive but the chain has {hops} hops")]
    NotTransitive {
        /// The share's reference
        reference: Reference,
        /// The chain length
        hops: usize,
    },

    /// An interior hop does not mention the hop after it
    #[error("Fetch chain {index} of {reference} failed; no reference to {next}")]
    ProofMissing {
        /// Position of the hop in the chain
        index: usize,
        /// The hop's reference
        reference: Reference,
        /// The reference that should have been found
        next: Reference,
    },

    /// Assembled delivery was requested through a non-transitive share
    #[error("Assembly of {target} requires a transitive share")]
    AssemblyNotTransitive {
        /// The requested blob
        target: Reference,
    },
}

/// The only thing a caller learns about a refused request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unauthorized")]
pub struct Denied;
