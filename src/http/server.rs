//! HTTP server for the admission service.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{PaddockError, Result};
use crate::ratelimit::WindowTracker;

/// HTTP server wrapping the admission service router.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The shared tracking store
    tracker: Arc<WindowTracker>,
}

impl HttpServer {
    /// Create a new server bound to `addr` over the given tracker.
    pub fn new(addr: SocketAddr, tracker: Arc<WindowTracker>) -> Self {
        Self { addr, tracker }
    }

    /// Start the server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let app = super::service::router(self.tracker);

        info!(addr = %self.addr, "Starting HTTP server for admission service");

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await.map_err(|e| {
            error!(error = %e, "HTTP server failed");
            PaddockError::Io(e)
        })
    }

    /// Start the server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = super::service::router(self.tracker);

        info!(
            addr = %self.addr,
            "Starting HTTP server for admission service with graceful shutdown"
        );

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                PaddockError::Io(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let tracker = Arc::new(WindowTracker::new());
        let _server = HttpServer::new(addr, tracker);
    }

    #[tokio::test]
    async fn test_serve_with_shutdown_stops_on_signal() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let tracker = Arc::new(WindowTracker::new());
        let server = HttpServer::new(addr, tracker);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(async {
            let _ = rx.await;
        }));

        let _ = tx.send(());
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
