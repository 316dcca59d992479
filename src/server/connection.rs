//! TCP/TLS connection handling.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming as IncomingBody;
use hyper::service::service_fn;
use hyper::Method;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, warn};

use super::compression::compress_response;
use super::error_pages::fill_error_body;
use super::Handler;
use crate::config::OptionalDuration;
use crate::core::{Error, Request, Response};
use crate::logging::{log_access, AccessEntry};
use crate::metrics::Metrics;

static X_REQUEST_ID: LazyLock<HeaderName> =
    LazyLock::new(|| HeaderName::from_static("x-request-id"));

mod http_versions {
    pub const HTTP_10: &str = "HTTP/1.0";
    pub const HTTP_11: &str = "HTTP/1.1";
    pub const HTTP_20: &str = "HTTP/2.0";

    /// Convert hyper::Version to static string.
    #[inline]
    pub fn from_hyper(version: hyper::Version) -> &'static str {
        match version {
            hyper::Version::HTTP_10 => HTTP_10,
            hyper::Version::HTTP_2 => HTTP_20,
            _ => HTTP_11,
        }
    }
}

/// Check if an error is a common connection reset or timeout.
#[inline]
fn is_connection_error(err_str: &str) -> bool {
    err_str.contains("connection reset")
        || err_str.contains("broken pipe")
        || err_str.contains("Connection reset")
        || err_str.contains("os error 104")
        || err_str.contains("os error 32")
        || err_str.contains("timed out")
        || err_str.contains("HeaderTimeout")
}

/// Client-supplied request ids are echoed back if they look sane.
fn request_id_from(headers: &http::HeaderMap) -> String {
    headers
        .get(&*X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
}

/// Per-listener state shared by every connection.
pub struct ConnectionContext<H: Handler> {
    pub handler: Arc<H>,
    pub metrics: Arc<Metrics>,
    pub active_connections: Arc<AtomicUsize>,
    pub request_timeout: OptionalDuration,
    /// Header read timeout (HEADER_TIMEOUT_SECS, default: 5s).
    pub header_timeout: Duration,
    pub max_body_size: usize,
    /// Access logging enabled (ACCESS_LOG=1).
    pub access_log_enabled: bool,
}

impl<H: Handler> ConnectionContext<H> {
    /// Serve one accepted connection until it closes or shutdown finishes it.
    pub async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        tls_acceptor: Option<TlsAcceptor>,
        shutdown_rx: watch::Receiver<bool>,
    ) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.metrics.inc_connections();

        match tls_acceptor {
            Some(acceptor) => {
                match tokio::time::timeout(Duration::from_secs(10), acceptor.accept(stream)).await
                {
                    Ok(Ok(tls_stream)) => {
                        Arc::clone(&self)
                            .serve(TokioIo::new(tls_stream), remote_addr, shutdown_rx)
                            .await
                    }
                    Ok(Err(e)) => debug!("TLS handshake failed: {:?}", e),
                    Err(_) => debug!("TLS handshake timeout: {:?}", remote_addr),
                }
            }
            None => {
                Arc::clone(&self)
                    .serve(TokioIo::new(stream), remote_addr, shutdown_rx)
                    .await
            }
        }

        self.metrics.dec_connections();
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    async fn serve<I>(
        self: Arc<Self>,
        io: TokioIo<I>,
        remote_addr: SocketAddr,
        mut shutdown_rx: watch::Receiver<bool>,
    ) where
        I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let header_timeout = self.header_timeout;
        let ctx = self;
        let service = service_fn(move |req| {
            let ctx = Arc::clone(&ctx);
            async move { ctx.handle_request(req, remote_addr).await }
        });

        let mut builder = auto::Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(Some(header_timeout))
            .keep_alive(true);
        builder.http2().max_concurrent_streams(250);

        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        // In-flight requests finish; idle keep-alive connections close
        let result = tokio::select! {
            result = conn.as_mut() => result,
            _ = shutdown_rx.changed() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        };

        if let Err(err) = result {
            let err_str = format!("{:?}", err);
            if !is_connection_error(&err_str) {
                debug!("Connection error: {:?}", err);
            }
        }
    }

    async fn handle_request(
        &self,
        req: hyper::Request<IncomingBody>,
        remote_addr: SocketAddr,
    ) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
        let request_start = Instant::now();
        let request_id = request_id_from(req.headers());

        let method = req.method().clone();
        let is_head = method == Method::HEAD;
        let http_version = http_versions::from_hyper(req.version());
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        let (parts, body) = req.into_parts();
        let request = match self.read_body(&parts.headers, body).await {
            Ok(bytes) => Request::from(http::Request::from_parts(parts, bytes)),
            Err(e) => {
                debug!(request_id = %request_id, error = %e, "Rejected request body");
                let mut response = Response::empty(e.status());
                if matches!(e, Error::PayloadTooLarge { .. }) {
                    // The unread body would otherwise be parsed as the next request
                    response = response.with_header(
                        http::header::CONNECTION,
                        HeaderValue::from_static("close"),
                    );
                }
                let accepts_html = parts_accept_html(&parts.headers);
                return Ok(self.finish(
                    response,
                    FinishInfo {
                        request_id: &request_id,
                        method: &method,
                        path: &path,
                        query: query.as_deref(),
                        http_version,
                        remote_addr,
                        ua: None,
                        referer: None,
                        accepts_html,
                        accepts_brotli: false,
                        is_head,
                        start: request_start,
                    },
                ));
            }
        };

        let accepts_html = request.accepts_html();
        let accepts_brotli = request.accepts_brotli();
        let ua = request.user_agent().map(str::to_string);
        let referer = request.referer().map(str::to_string);

        let response = match self.request_timeout.as_duration() {
            Some(limit) => {
                match tokio::time::timeout(limit, self.dispatch(request, &request_id)).await {
                    Ok(response) => response,
                    Err(_) => {
                        warn!(request_id = %request_id, path = %path, "Request timeout");
                        Response::gateway_timeout()
                    }
                }
            }
            None => self.dispatch(request, &request_id).await,
        };

        Ok(self.finish(
            response,
            FinishInfo {
                request_id: &request_id,
                method: &method,
                path: &path,
                query: query.as_deref(),
                http_version,
                remote_addr,
                ua: ua.as_deref(),
                referer: referer.as_deref(),
                accepts_html,
                accepts_brotli,
                is_head,
                start: request_start,
            },
        ))
    }

    /// Buffer the body, refusing anything over the configured limit.
    async fn read_body(&self, headers: &http::HeaderMap, body: IncomingBody) -> Result<Bytes, Error> {
        let limit = self.max_body_size;

        let declared = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if declared.is_some_and(|len| len > limit as u64) {
            return Err(Error::PayloadTooLarge { limit });
        }

        match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                Err(Error::PayloadTooLarge { limit })
            }
            Err(e) => Err(Error::InvalidRequest(format!("failed to read body: {}", e))),
        }
    }

    async fn dispatch(&self, request: Request, request_id: &str) -> Response {
        let path = request.path().to_string();
        match self.handler.handle(request).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status();
                if status.is_server_error() {
                    error!(request_id = %request_id, path = %path, error = %e, "Request failed");
                } else {
                    debug!(request_id = %request_id, path = %path, error = %e, "Bad request");
                }
                Response::empty(status)
            }
        }
    }

    /// Error bodies, compression, request id, HEAD handling, metrics and access log.
    fn finish(&self, response: Response, info: FinishInfo<'_>) -> hyper::Response<Full<Bytes>> {
        let mut response = fill_error_body(response, info.accepts_html);
        if info.accepts_brotli {
            response = compress_response(response);
        }
        if let Ok(value) = HeaderValue::try_from(info.request_id) {
            response.headers_mut().insert(X_REQUEST_ID.clone(), value);
        }

        let status = response.status();
        let (status_code, mut headers, mut body) = response.into_parts();
        let body_len = body.len();

        // HEAD: same headers as GET, no body
        if info.is_head {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body_len));
            body = Bytes::new();
        }

        let duration = info.start.elapsed();
        self.metrics.record_http_request(
            info.method.as_str(),
            self.handler.route_label(info.path),
            status.as_u16(),
            duration.as_secs_f64(),
        );

        if self.access_log_enabled {
            let ip = info.remote_addr.ip().to_string();
            log_access(&AccessEntry {
                method: info.method.as_str(),
                path: info.path,
                query: info.query,
                http: info.http_version,
                status: status.as_u16(),
                bytes: if info.is_head { 0 } else { body_len as u64 },
                duration_ms: duration.as_secs_f64() * 1000.0,
                ip: &ip,
                ua: info.ua,
                referer: info.referer,
                request_id: info.request_id,
            });
        }

        let mut out = hyper::Response::new(Full::new(body));
        *out.status_mut() = status_code;
        *out.headers_mut() = headers;
        out
    }
}

/// Request facts captured before the request is handed to the handler.
struct FinishInfo<'a> {
    request_id: &'a str,
    method: &'a Method,
    path: &'a str,
    query: Option<&'a str>,
    http_version: &'static str,
    remote_addr: SocketAddr,
    ua: Option<&'a str>,
    referer: Option<&'a str>,
    accepts_html: bool,
    accepts_brotli: bool,
    is_head: bool,
    start: Instant,
}

fn parts_accept_html(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html") || v.contains("*/*"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_versions_from_hyper() {
        assert_eq!(http_versions::from_hyper(hyper::Version::HTTP_10), "HTTP/1.0");
        assert_eq!(http_versions::from_hyper(hyper::Version::HTTP_11), "HTTP/1.1");
        assert_eq!(http_versions::from_hyper(hyper::Version::HTTP_2), "HTTP/2.0");
    }

    #[test]
    fn test_request_id_echo_or_generate() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        assert_eq!(request_id_from(&headers), "abc-123");

        let generated = request_id_from(&http::HeaderMap::new());
        assert_eq!(generated.len(), 32);
        assert!(generated.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_connection_errors_are_quiet() {
        assert!(is_connection_error("Os { code: 104, os error 104 }"));
        assert!(is_connection_error("hyper::Error(HeaderTimeout)"));
        assert!(!is_connection_error("hyper::Error(Parse(Method))"));
    }
}
