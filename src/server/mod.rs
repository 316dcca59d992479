//! HTTP server with a pluggable request handler.
//!
//! [`Server`] owns the listeners and the connection lifecycle. Everything
//! application specific sits behind the [`Handler`] trait.
//!
//! # Features
//!
//! - **HTTP/1.1 and HTTP/2** - automatic protocol detection
//! - **TLS/HTTPS** - rustls with ALPN negotiation
//! - **Graceful Shutdown** - connection draining with configurable timeout
//! - **Brotli** - compression of text responses
//! - **Error Pages** - default bodies for 4xx/5xx responses
//!
//! # Graceful Shutdown
//!
//! ```rust,ignore
//! server.trigger_shutdown();
//! server.wait_for_drain(Duration::from_secs(30)).await;
//! ```

pub mod compression;
mod connection;
pub mod error_pages;
mod internal;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

use connection::ConnectionContext;
use internal::{run_internal_server, InternalState};

use crate::config::ServerConfig;
use crate::core::{Request, Response, Result};
use crate::metrics::Metrics;

/// Application side of the server.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Backend name reported by the health endpoint.
    fn name(&self) -> &'static str;

    /// Low-cardinality label for a path, used in metrics.
    fn route_label(&self, path: &str) -> &'static str;

    /// Produce the response for a fully buffered request.
    async fn handle(&self, req: Request) -> Result<Response>;

    /// Whether dependencies are reachable.
    async fn ready(&self) -> bool;
}

/// HTTP server generic over its [`Handler`].
pub struct Server<H: Handler> {
    config: ServerConfig,
    ctx: Arc<ConnectionContext<H>>,
    listener: TcpListener,
    internal_listener: Option<Arc<TcpListener>>,
    tls_acceptor: Option<TlsAcceptor>,
    /// Active connections counter
    active_connections: Arc<AtomicUsize>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    shutdown_initiated: AtomicBool,
}

impl<H: Handler> Server<H> {
    /// Bind the public (and optional internal) listeners.
    ///
    /// Port 0 picks a free port; see [`Server::local_addr`].
    pub async fn bind(
        config: ServerConfig,
        handler: H,
        metrics: Arc<Metrics>,
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let tls_acceptor = config
            .tls
            .load()?
            .map(|tls| TlsAcceptor::from(Arc::new(tls)));

        let listener = TcpListener::bind(config.listen_addr).await?;
        let internal_listener = match config.internal_addr {
            Some(addr) => Some(Arc::new(TcpListener::bind(addr).await?)),
            None => None,
        };

        if config.access_log {
            info!("Access logging enabled (ACCESS_LOG=1)");
        }

        let active_connections = Arc::new(AtomicUsize::new(0));
        let ctx = Arc::new(ConnectionContext {
            handler: Arc::new(handler),
            metrics,
            active_connections: Arc::clone(&active_connections),
            request_timeout: config.request_timeout,
            header_timeout: config.header_timeout,
            max_body_size: config.max_body_size,
            access_log_enabled: config.access_log,
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            ctx,
            listener,
            internal_listener,
            tls_acceptor,
            active_connections,
            shutdown_tx,
            shutdown_rx,
            shutdown_initiated: AtomicBool::new(false),
        })
    }

    /// Address the public listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Address of the internal listener, if configured.
    pub fn internal_addr(&self) -> Option<SocketAddr> {
        self.internal_listener
            .as_ref()
            .and_then(|l| l.local_addr().ok())
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Accept connections until [`Server::trigger_shutdown`] is called.
    pub async fn run(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let scheme = if self.tls_acceptor.is_some() {
            "https"
        } else {
            "http"
        };
        info!(
            "Server listening on {}://{} (store: {})",
            scheme,
            self.local_addr()?,
            self.ctx.handler.name()
        );

        let internal_handle = self.internal_listener.as_ref().map(|listener| {
            let state = Arc::new(InternalState {
                handler: Arc::clone(&self.ctx.handler),
                metrics: Arc::clone(&self.ctx.metrics),
                active_connections: Arc::clone(&self.active_connections),
            });
            if let Some(addr) = self.internal_addr() {
                info!("Internal server listening on http://{}", addr);
            }
            tokio::spawn(run_internal_server(
                Arc::clone(listener),
                state,
                self.shutdown_rx.clone(),
            ))
        });

        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Accept error: {}", e);
                            continue;
                        }
                    };
                    let _ = stream.set_nodelay(true);

                    let ctx = Arc::clone(&self.ctx);
                    let tls = self.tls_acceptor.clone();
                    let conn_shutdown = self.shutdown_rx.clone();

                    tokio::spawn(async move {
                        ctx.handle_connection(stream, remote_addr, tls, conn_shutdown).await;
                    });
                }
                _ = shutdown_rx.changed() => {
                    debug!("Received shutdown signal, stopping accept loop");
                    break;
                }
            }
        }

        if let Some(handle) = internal_handle {
            let _ = handle.await;
        }

        Ok(())
    }

    /// Stop accepting and ask open connections to finish.
    pub fn trigger_shutdown(&self) {
        if self.shutdown_initiated.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
    }

    pub fn drain_timeout(&self) -> Duration {
        self.config.drain_timeout
    }

    /// Wait until every connection has closed. Returns false on timeout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        let check_interval = Duration::from_millis(100);

        loop {
            let active = self.active_connections.load(Ordering::Relaxed);
            if active == 0 {
                return true;
            }

            if start.elapsed() >= timeout {
                warn!("Drain timeout reached with {} active connections", active);
                return false;
            }

            debug!("Waiting for {} connections to drain...", active);
            tokio::time::sleep(check_interval).await;
        }
    }
}
