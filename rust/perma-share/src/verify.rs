use std::time::SystemTime;

use perma_schema::{Blob, MAX_SCHEMA_BLOB_SIZE, Share};
use perma_storage::{BlobFetcher, FetchedBlob, Reference};
use tokio::io::AsyncReadExt;

use crate::{DenialReason, FetchChain};

/// A source of wall-clock time, used to decide share expiry.
pub type Clock = fn() -> SystemTime;

/// What a caller learns from verifying a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The chain proves access to its target
    Authorized {
        /// Whether the root share was transitive
        transitive: bool,
    },
    /// The chain proves nothing
    Denied,
}

/// Proof that a chain grants access to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    share: Reference,
    transitive: bool,
}

impl Authorization {
    /// The root share the chain was verified against.
    pub fn share(&self) -> &Reference {
        &self.share
    }

    /// Whether the root share was transitive; only transitive chains may be
    /// assembled.
    pub fn is_transitive(&self) -> bool {
        self.transitive
    }
}

/// Walks a [FetchChain] against a [BlobFetcher].
#[derive(Clone)]
pub struct ChainVerifier<Fetcher> {
    fetcher: Fetcher,
    clock: Clock,
}

impl<Fetcher> ChainVerifier<Fetcher>
where
    Fetcher: BlobFetcher,
{
    /// A verifier that reads hops from `fetcher` and judges expiry by the
    /// system clock.
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            clock: SystemTime::now,
        }
    }

    /// Judge expiry by `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The fetcher hops are read from.
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Verify `chain`, logging the cause of any denial.
    pub async fn verify(&self, chain: &FetchChain) -> VerificationOutcome {
        match self.prove(chain).await {
            Ok(authorization) => VerificationOutcome::Authorized {
                transitive: authorization.is_transitive(),
            },
            Err(reason) => {
                tracing::info!(%reason, "Share chain denied");
                VerificationOutcome::Denied
            }
        }
    }

    /// Verify `chain`, returning the detailed [DenialReason] on failure.
    ///
    /// Hops are visited strictly in order and the walk stops at the first
    /// failure. Each fetched blob is dropped before the next hop is fetched.
    pub async fn prove(&self, chain: &FetchChain) -> Result<Authorization, DenialReason> {
        let share = self.prove_root(chain).await?;

        // Every window pairs a hop with its successor, so the leaf is only
        // ever visited as the successor of the hop that vouches for it
        for (index, hop) in chain.hops().windows(2).enumerate().skip(1) {
            self.prove_interior(index, &hop[0], &hop[1]).await?;
        }

        Ok(Authorization {
            share: share.reference().clone(),
            transitive: share.is_transitive(),
        })
    }

    async fn prove_root(&self, chain: &FetchChain) -> Result<Share, DenialReason> {
        let reference = chain.root();
        let blob = self.fetch(0, reference).await?;

        if blob.size() > MAX_SCHEMA_BLOB_SIZE {
            return Err(DenialReason::TooLarge {
                reference: reference.clone(),
                size: blob.size(),
            });
        }

        let share = Blob::from_reader(reference, blob)
            .await
            .map_err(|error| DenialReason::Decode {
                reference: reference.clone(),
                error,
            })?
            .as_share()
            .ok_or_else(|| DenialReason::NotAShare {
                reference: reference.clone(),
            })?;

        if share.is_expired_at((self.clock)()) {
            return Err(DenialReason::Expired {
                reference: reference.clone(),
                expires: share.expires().unwrap_or_default(),
            });
        }

        if let Some(requested) = chain.next(0) {
            if requested != share.target() {
                return Err(DenialReason::TargetMismatch {
                    reference: reference.clone(),
                    requested: requested.clone(),
                    target: share.target().clone(),
                });
            }
        }

        let hops = chain.hops().len();
        if hops > 2 && !share.is_transitive() {
            return Err(DenialReason::NotTransitive {
                reference: reference.clone(),
                hops,
            });
        }

        Ok(share)
    }

    async fn prove_interior(
        &self,
        index: usize,
        reference: &Reference,
        next: &Reference,
    ) -> Result<(), DenialReason> {
        let blob = self.fetch(index, reference).await?;

        // Interior hops are raw content, so long blobs are truncated rather
        // than rejected
        let mut contents = Vec::new();
        blob.take(MAX_SCHEMA_BLOB_SIZE)
            .read_to_end(&mut contents)
            .await
            .map_err(|error| DenialReason::Read {
                index,
                reference: reference.clone(),
                error,
            })?;

        // Plain substring containment of the next reference's text. This is a
        // weak, format-agnostic proof and is kept as-is for compatibility.
        let sought = next.to_string();
        if !contains(&contents, sought.as_bytes()) {
            return Err(DenialReason::ProofMissing {
                index,
                reference: reference.clone(),
                next: next.clone(),
            });
        }

        Ok(())
    }

    async fn fetch(&self, index: usize, reference: &Reference) -> Result<FetchedBlob, DenialReason> {
        self.fetcher
            .fetch(reference)
            .await
            .map_err(|error| DenialReason::Fetch {
                index,
                reference: reference.clone(),
                error,
            })
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    memchr::memmem::find(haystack, needle).is_some()
}
