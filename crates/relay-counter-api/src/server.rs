//! HTTP listener lifecycle.
//!
//! [`Server::run`] binds the port and then drives two futures under one
//! cancellation scope:
//!
//! 1. **serve**: accepts connections until the scope is cancelled, then
//!    drains in-flight requests. If draining outlasts the grace period it
//!    stops waiting and closes the listener.
//! 2. **shutdown watcher**: waits for the governing token, logs the request
//!    and waits for serve to finish draining.
//!
//! Whichever side ends first decides the [`ExitReason`]. Both futures are
//! joined before `run` returns; a stopped server is never restarted.

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use relay_counter_core::RecordStore;

use crate::state::{AppConfig, AppState};

/// Why the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The governing token was cancelled and the listener shut down.
    Cancelled,
    /// The listener closed without a shutdown request.
    ListenerClosed,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "shutdown requested"),
            Self::ListenerClosed => write!(f, "listener closed"),
        }
    }
}

/// Fatal server conditions.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Serving stopped with an I/O error before any shutdown request.
    #[error("http server failed: {0}")]
    Serve(#[source] io::Error),
}

/// The relay counter HTTP server: configuration plus the assembled router.
#[derive(Debug)]
pub struct Server {
    config: AppConfig,
    router: Router,
}

impl Server {
    /// Build a server writing to `store` and gated by the configured keys.
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        let state = AppState::new(store, config.authorized_keys.clone());
        Self {
            router: crate::app(state),
            config,
        }
    }

    /// Address `run` binds: all interfaces on the configured port.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.port))
    }

    /// Bind the configured port and serve until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// [`ServerError::Bind`] if the port is unavailable;
    /// [`ServerError::Serve`] if serving fails on its own.
    pub async fn run(self, shutdown: CancellationToken) -> Result<ExitReason, ServerError> {
        let addr = self.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` is cancelled.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<ExitReason, ServerError> {
        match listener.local_addr() {
            Ok(addr) => info!(%addr, "Relay Counter is listening"),
            Err(e) => warn!(error = %e, "Relay Counter is listening on an unknown address"),
        }

        let grace = self.config.shutdown_grace;
        let scope = shutdown.child_token();
        let drained = CancellationToken::new();

        let serve = serve_until(self.router, listener, scope.clone(), drained.clone(), grace);
        let watch = watch_shutdown(shutdown, scope, drained);

        let (served, shutdown_requested) = tokio::join!(serve, watch);

        match (shutdown_requested, served) {
            (true, Ok(())) => {
                info!(reason = %ExitReason::Cancelled, "http server exited");
                Ok(ExitReason::Cancelled)
            }
            (true, Err(e)) => {
                error!(error = %e, "error closing http server");
                Ok(ExitReason::Cancelled)
            }
            (false, Ok(())) => {
                info!(reason = %ExitReason::ListenerClosed, "http server exited");
                Ok(ExitReason::ListenerClosed)
            }
            (false, Err(e)) => {
                error!(error = %e, "http server failed");
                Err(ServerError::Serve(e))
            }
        }
    }
}

/// Serve `router` until `scope` is cancelled, allowing `grace` for draining.
/// Cancels `scope` and `drained` on the way out.
async fn serve_until(
    router: Router,
    listener: TcpListener,
    scope: CancellationToken,
    drained: CancellationToken,
    grace: Duration,
) -> io::Result<()> {
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(scope.clone().cancelled_owned())
        .into_future();
    let forced_close = async {
        scope.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    let result = tokio::select! {
        result = server => result,
        () = forced_close => {
            warn!(
                grace_secs = grace.as_secs_f64(),
                "grace period elapsed with requests in flight, closing listener"
            );
            Ok(())
        }
    };

    scope.cancel();
    drained.cancel();
    result
}

/// Wait for either the governing token or the serve side to end the scope.
/// Returns `true` when the governing token asked for shutdown.
async fn watch_shutdown(
    shutdown: CancellationToken,
    scope: CancellationToken,
    drained: CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => {}
        () = scope.cancelled() => return false,
    }

    info!("shutdown requested, draining in-flight requests");
    drained.cancelled().await;
    info!("http server shut down");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::Cancelled.to_string(), "shutdown requested");
        assert_eq!(ExitReason::ListenerClosed.to_string(), "listener closed");
    }

    #[test]
    fn bind_error_names_address() {
        let err = ServerError::Bind {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.0.0.0:8080"), "got: {msg}");
        assert!(msg.contains("address in use"), "got: {msg}");
    }

    #[test]
    fn addr_uses_all_interfaces() {
        let config = AppConfig {
            port: 9123,
            ..AppConfig::default()
        };
        let server = Server::new(config, Arc::new(relay_counter_core::MemoryStore::new()));
        assert_eq!(server.addr(), SocketAddr::from(([0, 0, 0, 0], 9123)));
    }

    #[tokio::test]
    async fn watcher_reports_serve_side_exit() {
        let shutdown = CancellationToken::new();
        let scope = shutdown.child_token();
        let drained = CancellationToken::new();
        scope.cancel();
        drained.cancel();
        assert!(!watch_shutdown(shutdown, scope, drained).await);
    }

    #[tokio::test]
    async fn watcher_prefers_governing_token() {
        let shutdown = CancellationToken::new();
        let scope = shutdown.child_token();
        let drained = CancellationToken::new();
        shutdown.cancel();
        drained.cancel();
        assert!(watch_shutdown(shutdown, scope, drained).await);
    }
}
