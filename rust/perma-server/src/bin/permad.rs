use anyhow::Result;
use clap::Parser;
use perma_server::{PermadCli, Server, ShareHandler};
use perma_storage::FileSystemBlobStore;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
pub async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = PermadCli::parse();
    let config = cli.load_config().await?;

    let store = FileSystemBlobStore::new(&config.blob_root).await?;
    let handler = ShareHandler::from_config(store, &config)?;
    let server = Server::bind(config.listen, handler).await?;

    tracing::info!(
        address = %server.local_addr()?,
        blob_root = %config.blob_root.display(),
        prefix = %config.prefix,
        "Serving shares"
    );

    server
        .serve(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!(%error, "Can't listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
