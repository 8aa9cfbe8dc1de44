use std::time::SystemTime;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use perma_storage::Reference;
use serde::{Deserialize, Serialize};

use crate::{Blob, PermaSchemaError, SCHEMA_VERSION};

/// The only share authorization type: holding a reference to the share blob
/// is proof enough.
pub const HAVE_REF_AUTH: &str = "haveref";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareFields {
    auth_type: String,
    target: String,
    #[serde(default)]
    transitive: bool,
    #[serde(default)]
    expires: Option<String>,
}

/// A share descriptor: a capability that lets anyone holding its reference
/// read `target`, and, when `transitive`, anything `target` leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    reference: Reference,
    target: Reference,
    transitive: bool,
    expires: Option<DateTime<Utc>>,
}

impl Share {
    /// The reference of the share blob itself.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// The blob this share grants access to.
    pub fn target(&self) -> &Reference {
        &self.target
    }

    /// Whether the share also grants access to blobs reachable from its
    /// target.
    pub fn is_transitive(&self) -> bool {
        self.transitive
    }

    /// When the share stops granting access, if ever.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// True once `now` is past the share's expiration. Shares without an
    /// expiration never expire.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expires
            .is_some_and(|expires| DateTime::<Utc>::from(now) > expires)
    }
}

impl Blob {
    /// View this blob as a [Share], if it is a well formed share descriptor.
    ///
    /// The blob must have `camliType` `"share"`, `authType` `"haveref"`, a
    /// `target` in canonical reference form and, if present, an RFC 3339
    /// `expires`.
    pub fn as_share(&self) -> Option<Share> {
        let fields: ShareFields = self.fields("share")?;

        if fields.auth_type != HAVE_REF_AUTH {
            return None;
        }

        let target = fields.target.parse().ok()?;
        let expires = match fields.expires {
            Some(expires) => Some(
                DateTime::parse_from_rfc3339(&expires)
                    .ok()?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Some(Share {
            reference: self.reference().clone(),
            target,
            transitive: fields.transitive,
            expires,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareDocument<'a> {
    camli_version: u64,
    camli_type: &'static str,
    auth_type: &'static str,
    target: &'a Reference,
    transitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires: Option<String>,
}

/// Encodes share descriptors.
///
/// ```rust
/// use perma_schema::ShareBuilder;
/// use perma_storage::Reference;
///
/// let target = Reference::of(b"a private photo");
/// let bytes = ShareBuilder::new(target).transitive(true).build().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ShareBuilder {
    target: Reference,
    transitive: bool,
    expires: Option<DateTime<Utc>>,
}

impl ShareBuilder {
    /// Start a non-transitive, non-expiring share of `target`.
    pub fn new(target: Reference) -> Self {
        Self {
            target,
            transitive: false,
            expires: None,
        }
    }

    /// Set whether the share extends to blobs reachable from its target.
    pub fn transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }

    /// Set when the share stops granting access.
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Encode the share descriptor as schema blob bytes.
    pub fn build(&self) -> Result<Bytes, PermaSchemaError> {
        let document = ShareDocument {
            camli_version: SCHEMA_VERSION,
            camli_type: "share",
            auth_type: HAVE_REF_AUTH,
            target: &self.target,
            transitive: self.transitive,
            expires: self
                .expires
                .map(|expires| expires.to_rfc3339_opts(SecondsFormat::Secs, true)),
        };

        serde_json::to_vec_pretty(&document)
            .map(Bytes::from)
            .map_err(|error| PermaSchemaError::EncodeFailed(format!("{error}")))
    }
}
