use hyper::Method;
use perma_share::{Delivery, FetchChain};
use perma_storage::Reference;
use thiserror::Error;

/// A request that cannot be understood, answered with a `400` at once.
///
/// These say nothing about whether any blob exists, so they are not subject
/// to the denial floor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Shares are only ever read
    #[error("Invalid method")]
    InvalidMethod,

    /// The path after the share prefix does not start with a reference
    #[error("Malformed share path suffix: {0}")]
    MalformedPath(String),

    /// An entry of the `via` query parameter is not a reference
    #[error("Malformed reference in via param")]
    MalformedVia,
}

/// A well formed share request: the chain to verify and how the target
/// should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    /// The presented chain, ending at the requested blob
    pub chain: FetchChain,
    /// How the requested blob should be delivered
    pub delivery: Delivery,
}

impl ShareRequest {
    /// Parse a request from its method, the path after the share prefix and
    /// the raw query string.
    ///
    /// The path may carry anything after the target reference and a `/`,
    /// typically a file name; it is ignored. Only the first `via` and
    /// `assemble` parameters count.
    pub fn parse(
        method: &Method,
        suffix: &str,
        query: Option<&str>,
    ) -> Result<Self, ClientError> {
        let (target, _) = suffix.split_once('/').unwrap_or((suffix, ""));
        let target: Reference = target
            .parse()
            .map_err(|_| ClientError::MalformedPath(suffix.to_string()))?;

        if method != Method::GET {
            return Err(ClientError::InvalidMethod);
        }

        let via = first_value(query, "via").unwrap_or_default();
        let via = if via.is_empty() {
            Vec::new()
        } else {
            via.split(',')
                .map(|hop| hop.parse().map_err(|_| ClientError::MalformedVia))
                .collect::<Result<Vec<Reference>, _>>()?
        };

        let delivery = match first_value(query, "assemble") {
            Some(value) if is_true(&value) => Delivery::Assembled,
            _ => Delivery::Raw,
        };

        Ok(ShareRequest {
            chain: FetchChain::new(via, target),
            delivery,
        })
    }
}

fn is_true(value: &str) -> bool {
    matches!(value, "1" | "t" | "T") || value.eq_ignore_ascii_case("true")
}

fn first_value(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
