//! Internal HTTP server for health and metrics endpoints.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error};

use super::Handler;
use crate::metrics::Metrics;

/// Shared state behind the internal endpoints.
pub struct InternalState<H: Handler> {
    pub handler: Arc<H>,
    pub metrics: Arc<Metrics>,
    pub active_connections: Arc<AtomicUsize>,
}

/// Serve `/health` and `/metrics` until shutdown is signalled.
pub async fn run_internal_server<H: Handler>(
    listener: Arc<TcpListener>,
    state: Arc<InternalState<H>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                let stream = match result {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        error!("Internal server accept error: {}", e);
                        continue;
                    }
                };
                let _ = stream.set_nodelay(true);
                let state = Arc::clone(&state);

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_internal_request(req, &state).await }
                    });

                    let io = TokioIo::new(stream);
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
            _ = shutdown_rx.changed() => {
                debug!("Internal server received shutdown signal");
                break;
            }
        }
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(content_type),
    );
    response
}

/// Handle internal server requests (/health, /metrics).
async fn handle_internal_request<H: Handler>(
    req: Request<IncomingBody>,
    state: &InternalState<H>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match req.uri().path() {
        "/health" => {
            let ready = state.handler.ready().await;
            let body = serde_json::json!({
                "status": if ready { "ok" } else { "unavailable" },
                "store": state.handler.name(),
                "active_connections": state.active_connections.load(Ordering::Relaxed),
                "version": crate::VERSION,
            });
            let status = if ready {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            respond(status, "application/json", body.to_string())
        }
        "/metrics" => match state.metrics.export() {
            Ok(text) => respond(StatusCode::OK, "text/plain; version=0.0.4", text),
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "text/plain",
                    "Internal Server Error".to_string(),
                )
            }
        },
        _ => respond(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string()),
    };

    Ok(response)
}
