use hyper::{Request, Response, header::HeaderValue};
use perma_share::{ChainVerifier, Delivery, DenialFloor, ShareGate};
use perma_storage::BlobFetcher;

use crate::{
    PermaServerError, ResponseBody, ServerConfig, ShareRequest, bad_request, challenge,
    not_found, serve_assembled, serve_raw, unauthorized,
};

/// Answers share requests under a path prefix.
#[derive(Clone)]
pub struct ShareHandler<Fetcher> {
    gate: ShareGate<Fetcher>,
    prefix: String,
    challenge: HeaderValue,
}

impl<Fetcher> ShareHandler<Fetcher>
where
    Fetcher: BlobFetcher + Clone + 'static,
{
    /// A handler serving blobs from `fetcher` under `prefix`, naming `realm`
    /// in denials and holding them for at least `floor`.
    pub fn new(
        fetcher: Fetcher,
        prefix: &str,
        realm: &str,
        floor: DenialFloor,
    ) -> Result<Self, PermaServerError> {
        let challenge = challenge(realm)
            .ok_or_else(|| PermaServerError::Config(format!("Unusable realm {realm:?}")))?;

        Ok(Self {
            gate: ShareGate::new(ChainVerifier::new(fetcher), floor),
            prefix: prefix.to_string(),
            challenge,
        })
    }

    /// A handler set up as `config` describes.
    pub fn from_config(fetcher: Fetcher, config: &ServerConfig) -> Result<Self, PermaServerError> {
        Self::new(fetcher, &config.prefix, &config.realm, config.denial_floor())
    }

    /// The gate requests are checked with.
    pub fn gate(&self) -> &ShareGate<Fetcher> {
        &self.gate
    }

    /// Answer one request.
    ///
    /// The denial floor is timed from the moment the request arrives, so the
    /// time spent parsing it counts toward the floor.
    pub async fn handle<Body>(&self, request: Request<Body>) -> Response<ResponseBody> {
        let timer = self.gate.start();
        let uri = request.uri();

        let Some(suffix) = uri.path().strip_prefix(self.prefix.as_str()) else {
            return not_found("Not found");
        };

        let ShareRequest { chain, delivery } =
            match ShareRequest::parse(request.method(), suffix, uri.query()) {
                Ok(request) => request,
                Err(error) => {
                    tracing::debug!(path = %uri, %error, "Malformed share request");
                    return bad_request(&error.to_string());
                }
            };

        tracing::debug!(reference = %chain.target(), hops = chain.hops().len(), ?delivery, "Share request");

        match self.gate.check_timed(timer, &chain, delivery).await {
            Ok((_, Delivery::Raw)) => serve_raw(self.gate.fetcher(), chain.target()).await,
            Ok((_, Delivery::Assembled)) => {
                serve_assembled(self.gate.fetcher().clone(), chain.target()).await
            }
            Err(_) => unauthorized(&self.challenge),
        }
    }
}
