//! HTTP response abstraction for handlers.

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};

/// Pre-allocated static header values for common content types.
mod content_types {
    use super::*;
    pub static TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
    pub static TEXT_HTML: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
    pub static APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");
}

/// HTTP response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    #[inline]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// 200 with an HTML body.
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::builder().html().body(body).build()
    }

    /// HTML body with a non-200 status (validation re-renders, 404 pages).
    pub fn html_with_status(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::builder().status(status).html().body(body).build()
    }

    /// JSON body with the given status.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::builder()
            .status(status)
            .json()
            .body(value.to_string())
            .build()
    }

    /// Plain text body with the given status.
    pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::builder().status(status).text().body(body).build()
    }

    /// 303 See Other, used after a successful POST.
    pub fn see_other(location: &str) -> Self {
        Self::redirect(StatusCode::SEE_OTHER, location)
    }

    /// 302 Found, used for GET redirects (login required, GET /logout).
    pub fn found(location: &str) -> Self {
        Self::redirect(StatusCode::FOUND, location)
    }

    fn redirect(status: StatusCode, location: &str) -> Self {
        Self::builder()
            .status(status)
            .header(header::LOCATION, location)
            .build()
    }

    /// Create a 404 Not Found response with an empty body (filled in by error pages).
    #[inline]
    pub fn not_found() -> Self {
        Self::empty(StatusCode::NOT_FOUND)
    }

    #[inline]
    pub fn gateway_timeout() -> Self {
        Self::empty(StatusCode::GATEWAY_TIMEOUT)
    }

    #[inline]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get a header value by name (case-insensitive).
    #[inline]
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE)
    }

    /// Append a `Set-Cookie` header. Several cookies may be set on one response.
    pub fn with_cookie(mut self, cookie: &str) -> Self {
        if let Ok(value) = HeaderValue::try_from(cookie) {
            self.headers.append(header::SET_COOKIE, value);
        }
        self
    }

    /// Replace a header.
    #[inline]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[inline]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Check if this is an error response (4xx or 5xx).
    #[inline]
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    /// Split into status, headers and body for the transport layer.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty(StatusCode::OK)
    }
}

/// Builder for creating HTTP responses.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Option<HeaderMap>,
    body: Bytes,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: None,
            body: Bytes::new(),
        }
    }

    #[inline]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header. Values that are not valid header text are dropped.
    #[inline]
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::try_from(value) {
            self.headers
                .get_or_insert_with(HeaderMap::new)
                .insert(name, value);
        }
        self
    }

    #[inline]
    fn header_value(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    #[inline]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[inline]
    pub fn html(self) -> Self {
        self.header_value(header::CONTENT_TYPE, content_types::TEXT_HTML.clone())
    }

    #[inline]
    pub fn json(self) -> Self {
        self.header_value(header::CONTENT_TYPE, content_types::APPLICATION_JSON.clone())
    }

    #[inline]
    pub fn text(self) -> Self {
        self.header_value(header::CONTENT_TYPE, content_types::TEXT_PLAIN.clone())
    }

    #[inline]
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers.unwrap_or_default(),
            body: self.body,
        }
    }
}
