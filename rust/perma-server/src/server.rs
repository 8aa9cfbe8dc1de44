use std::{convert::Infallible, future::Future, net::SocketAddr, sync::Arc};

use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use perma_storage::BlobFetcher;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{PermaServerError, ShareHandler};

/// A [ShareHandler] bound to a listening socket.
pub struct Server<Fetcher> {
    listener: TcpListener,
    handler: Arc<ShareHandler<Fetcher>>,
}

impl<Fetcher> Server<Fetcher>
where
    Fetcher: BlobFetcher + Clone + 'static,
{
    /// Bind `handler` to `address`. Port `0` picks any free port.
    pub async fn bind(
        address: SocketAddr,
        handler: ShareHandler<Fetcher>,
    ) -> Result<Self, PermaServerError> {
        let listener = TcpListener::bind(address).await?;

        Ok(Self {
            listener,
            handler: Arc::new(handler),
        })
    }

    /// The address the server is accepting connections on.
    pub fn local_addr(&self) -> Result<SocketAddr, PermaServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` completes. Each connection is
    /// served on its own task; connections already accepted are left to
    /// finish on their own.
    pub async fn serve<Shutdown>(self, shutdown: Shutdown) -> Result<(), PermaServerError>
    where
        Shutdown: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                result = self.listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(accepted) => accepted,
                        Err(error) => {
                            tracing::warn!(%error, "Failed to accept connection");
                            continue;
                        }
                    };

                    let handler = self.handler.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |request| {
                            let handler = handler.clone();
                            async move { Ok::<_, Infallible>(handler.handle(request).await) }
                        });

                        if let Err(error) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            tracing::debug!(%peer, %error, "Connection ended with an error");
                        }
                    });
                }
            }
        }

        tracing::info!("Share server shut down");

        Ok(())
    }

    /// Serve on a background task until the returned [RunningServer] is shut
    /// down.
    pub fn spawn(self) -> Result<RunningServer, PermaServerError> {
        let address = self.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(self.serve(async move {
            let _ = shutdown_rx.await;
        }));

        Ok(RunningServer {
            address,
            shutdown_tx,
            task,
        })
    }
}

/// A [Server] running on a background task.
pub struct RunningServer {
    /// The address the server is accepting connections on
    pub address: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<(), PermaServerError>>,
}

impl RunningServer {
    /// The base URL of the server, without a trailing slash.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Stop accepting connections and wait for the accept loop to end.
    pub async fn shutdown(self) -> Result<(), PermaServerError> {
        let _ = self.shutdown_tx.send(());

        match self.task.await {
            Ok(result) => result,
            Err(error) => Err(PermaServerError::Io(std::io::Error::other(error))),
        }
    }
}
