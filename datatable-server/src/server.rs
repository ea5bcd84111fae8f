//! Accept loop

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::routes::AppState;
use crate::routes::respond;

/// The mock API server bound to a socket.
///
/// # Example
///
/// ```ignore
/// let server = MockServer::bind(ServerConfig::default()).await?;
/// println!("listening on {}", server.local_addr()?);
/// server.run_until(shutdown).await?;
/// ```
pub struct MockServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl MockServer {
    /// Generates the dataset and binds `config.addr`.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.addr).await?;
        let state = Arc::new(AppState::new(config));
        log::debug!(
            "generated {} users from seed {}",
            state.dataset.users().len(),
            state.config.seed
        );
        Ok(Self { listener, state })
    }

    /// The bound address. Useful after binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections until `shutdown` fires.
    ///
    /// Each connection runs on its own task; connections still open at
    /// shutdown are left to finish on their own.
    pub async fn run_until(self, shutdown: CancellationToken) -> Result<()> {
        log::info!("listening on {}", self.local_addr()?);

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted?,
            };

            let state = self.state.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req: Request<Incoming>| {
                    let state = state.clone();
                    async move {
                        let response = respond(&state, req.method(), req.uri()).await;
                        Ok::<_, Infallible>(response)
                    }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    log::debug!("connection from {} closed: {}", peer, e);
                }
            });
        }
    }
}
