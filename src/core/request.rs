//! HTTP request abstraction for handlers.

use std::sync::LazyLock;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};

use super::Result;
use crate::form::{parse_cookies, FormData};

static X_REQUEST_ID: LazyLock<HeaderName> =
    LazyLock::new(|| HeaderName::from_static("x-request-id"));

/// Buffered HTTP request.
///
/// Clone is not derived; handlers borrow the request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    version: http::Version,
}

impl Request {
    #[inline]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            version: http::Version::HTTP_11,
        }
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Path plus query string, as used for `redirectTo`.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.uri.path())
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[inline]
    pub fn version(&self) -> http::Version {
        self.version
    }

    /// Get a header value by name (case-insensitive).
    #[inline]
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn accept(&self) -> Option<&str> {
        self.header(header::ACCEPT)
    }

    /// Check if client accepts HTML responses.
    /// Handles wildcards: text/html, text/*, */*
    pub fn accepts_html(&self) -> bool {
        self.accept()
            .map(|v| v.contains("text/html") || v.contains("*/*") || v.contains("text/*"))
            .unwrap_or(false)
    }

    /// Client asked for JSON and not for HTML (API clients, tests).
    pub fn wants_json(&self) -> bool {
        let json = self
            .accept()
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        json && !self.accepts_html()
    }

    /// Check if client accepts Brotli compression.
    pub fn accepts_brotli(&self) -> bool {
        self.header(header::ACCEPT_ENCODING)
            .map(|v| v.split(',').any(|enc| enc.trim().starts_with("br")))
            .unwrap_or(false)
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE)
    }

    #[inline]
    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT)
    }

    #[inline]
    pub fn referer(&self) -> Option<&str> {
        self.header(header::REFERER)
    }

    #[inline]
    pub fn request_id(&self) -> Option<&str> {
        self.header(&*X_REQUEST_ID)
    }

    /// First cookie named `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_cookies)
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Submitted fields: the query string for GET/HEAD, the body otherwise.
    pub async fn form(&self) -> Result<FormData> {
        if self.method == Method::GET || self.method == Method::HEAD {
            Ok(FormData::from_query(self.query().unwrap_or("")))
        } else {
            FormData::from_body(self.content_type(), self.body.clone()).await
        }
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
            version: parts.version,
        }
    }
}
