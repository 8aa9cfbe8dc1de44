use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::{PermaServerError, ServerConfig};

/// Command line arguments for `permad`.
#[derive(Debug, Parser)]
#[command(name = "permad")]
#[command(bin_name = "permad")]
#[command(about = "Serves shared blobs to anyone holding a share", long_about = None)]
pub struct PermadCli {
    /// A JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Accept connections on this address instead of the configured one
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Read blobs from this directory instead of the configured one
    #[arg(short, long)]
    pub blob_root: Option<PathBuf>,
}

impl PermadCli {
    /// Load the configuration file, if any, apply the command line overrides
    /// and validate the result.
    pub async fn load_config(&self) -> Result<ServerConfig, PermaServerError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_path(path).await?,
            None => ServerConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen = listen;
        }

        if let Some(blob_root) = &self.blob_root {
            config.blob_root = blob_root.clone();
        }

        config.validate()?;

        Ok(config)
    }
}
