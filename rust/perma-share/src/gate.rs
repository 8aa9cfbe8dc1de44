use perma_storage::{BlobFetcher, Reference};

use crate::{
    Authorization, ChainVerifier, DenialFloor, DenialReason, Denied, Delivery, FetchChain,
    FloorTimer, dispatch,
};

/// The single entry point for anonymous share access.
///
/// A [ShareGate] verifies a chain, applies the delivery rules and, on any
/// denial, logs the reason and holds the response until the [DenialFloor]
/// has passed. Grants are returned as soon as they are known.
#[derive(Clone)]
pub struct ShareGate<Fetcher> {
    verifier: ChainVerifier<Fetcher>,
    floor: DenialFloor,
}

impl<Fetcher> ShareGate<Fetcher>
where
    Fetcher: BlobFetcher,
{
    /// A gate over `verifier` that holds denials for at least `floor`.
    pub fn new(verifier: ChainVerifier<Fetcher>, floor: DenialFloor) -> Self {
        Self { verifier, floor }
    }

    /// The verifier chains are checked with.
    pub fn verifier(&self) -> &ChainVerifier<Fetcher> {
        &self.verifier
    }

    /// The fetcher hops, and authorized blobs, are read from.
    pub fn fetcher(&self) -> &Fetcher {
        self.verifier.fetcher()
    }

    /// The timing floor applied to denials.
    pub fn floor(&self) -> DenialFloor {
        self.floor
    }

    /// Start timing a request. Callers that do work of their own before
    /// [ShareGate::check_timed] should start the timer first, so that the
    /// work counts toward the floor.
    pub fn start(&self) -> FloorTimer {
        self.floor.start()
    }

    /// Check `chain` for `requested` delivery, timing from now.
    pub async fn check(
        &self,
        chain: &FetchChain,
        requested: Delivery,
    ) -> Result<(Authorization, Delivery), Denied> {
        let timer = self.start();
        self.check_timed(timer, chain, requested).await
    }

    /// Check `chain` for `requested` delivery against an already running
    /// `timer`.
    pub async fn check_timed(
        &self,
        timer: FloorTimer,
        chain: &FetchChain,
        requested: Delivery,
    ) -> Result<(Authorization, Delivery), Denied> {
        match self.authorize(chain, requested).await {
            Ok(granted) => Ok(granted),
            Err(reason) => Err(self.deny(timer, chain.target(), reason).await),
        }
    }

    async fn authorize(
        &self,
        chain: &FetchChain,
        requested: Delivery,
    ) -> Result<(Authorization, Delivery), DenialReason> {
        let authorization = self.verifier.prove(chain).await?;
        let delivery = dispatch(&authorization, requested, chain.target())?;

        Ok((authorization, delivery))
    }

    async fn deny(&self, timer: FloorTimer, target: &Reference, reason: DenialReason) -> Denied {
        tracing::info!(reference = %target, %reason, "Denying share access");
        timer.elapse().await;
        Denied
    }
}
