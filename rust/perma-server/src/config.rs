use std::{
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use perma_share::{DEFAULT_DENIAL_FLOOR, DenialFloor};
use serde::{Deserialize, Serialize};

use crate::PermaServerError;

/// The port `permad` listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 3179;

/// Configuration for a share server, usually read from a JSON file:
///
/// ```json
/// {
///   "listen": "0.0.0.0:3179",
///   "blobRoot": "/var/lib/perma/blobs",
///   "prefix": "/share/",
///   "realm": "perma",
///   "denialFloorMs": 200
/// }
/// ```
///
/// Every field but `blobRoot` may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    /// The address to accept connections on
    pub listen: SocketAddr,
    /// The directory blobs are stored in
    pub blob_root: PathBuf,
    /// The path prefix shares are served under; starts and ends with `/`
    pub prefix: String,
    /// The realm named in the `WWW-Authenticate` challenge of a denial
    pub realm: String,
    /// The minimum time, in milliseconds, a denial takes
    pub denial_floor_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            blob_root: PathBuf::new(),
            prefix: "/share/".to_string(),
            realm: "perma".to_string(),
            denial_floor_ms: DEFAULT_DENIAL_FLOOR.as_millis() as u64,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, PermaServerError> {
        serde_json::from_str(json).map_err(|error| PermaServerError::Config(format!("{error}")))
    }

    /// Read and parse the JSON configuration file at `path`.
    pub async fn from_path<P>(path: P) -> Result<Self, PermaServerError>
    where
        P: AsRef<Path>,
    {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    /// Check that the configuration can be served from.
    pub fn validate(&self) -> Result<(), PermaServerError> {
        if self.blob_root.as_os_str().is_empty() {
            return Err(PermaServerError::Config("No blobRoot defined".into()));
        }

        if !self.prefix.starts_with('/') || !self.prefix.ends_with('/') {
            return Err(PermaServerError::Config(format!(
                "Share prefix must start and end with '/', got {:?}",
                self.prefix
            )));
        }

        if self.realm.contains('"') || self.realm.chars().any(char::is_control) {
            return Err(PermaServerError::Config(format!(
                "Realm may not contain quotes or control characters, got {:?}",
                self.realm
            )));
        }

        Ok(())
    }

    /// The timing floor denials are held to.
    pub fn denial_floor(&self) -> DenialFloor {
        DenialFloor::new(Duration::from_millis(self.denial_floor_ms))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_fills_in_omitted_fields() -> Result<()> {
        let config = ServerConfig::from_json(r#"{ "blobRoot": "/tmp/blobs" }"#)?;

        assert_eq!(
            config,
            ServerConfig {
                blob_root: PathBuf::from("/tmp/blobs"),
                ..ServerConfig::default()
            }
        );
        assert_eq!(config.denial_floor(), DenialFloor::default());
        config.validate()?;

        Ok(())
    }

    #[test]
    fn it_reads_every_field() -> Result<()> {
        let config = ServerConfig::from_json(
            r#"{
                "listen": "0.0.0.0:8080",
                "blobRoot": "/srv/blobs",
                "prefix": "/s/",
                "realm": "photos",
                "denialFloorMs": 50
            }"#,
        )?;

        assert_eq!(config.listen, "0.0.0.0:8080".parse::<SocketAddr>()?);
        assert_eq!(config.prefix, "/s/");
        assert_eq!(config.realm, "photos");
        assert_eq!(config.denial_floor().duration(), Duration::from_millis(50));

        Ok(())
    }

    #[test]
    fn it_requires_a_blob_root() {
        let error = ServerConfig::default().validate().unwrap_err();

        assert_eq!(
            error.to_string(),
            "Invalid configuration: No blobRoot defined"
        );
    }

    #[test]
    fn it_rejects_unusable_values() {
        let base = ServerConfig {
            blob_root: PathBuf::from("/srv/blobs"),
            ..ServerConfig::default()
        };

        for config in [
            ServerConfig {
                prefix: "share".into(),
                ..base.clone()
            },
            ServerConfig {
                realm: "a \"quoted\" realm".into(),
                ..base.clone()
            },
        ] {
            assert!(config.validate().is_err());
        }

        assert!(ServerConfig::from_json(r#"{ "blobroot": "/srv" }"#).is_err());
    }
}
