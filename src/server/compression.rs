//! Brotli compression for text responses.

use http::header::{HeaderValue, CONTENT_ENCODING, VARY};

use crate::core::Response;

/// Minimum size to consider compression (smaller bodies don't benefit)
pub const MIN_COMPRESSION_SIZE: usize = 256;

/// Brotli compression quality (0-11, higher = better compression but slower)
const BROTLI_QUALITY: i32 = 4;

/// Brotli compression window size (10-24, affects memory usage)
const BROTLI_WINDOW: i32 = 20;

/// Check if the MIME type should be compressed
#[inline]
pub fn should_compress_mime(content_type: &str) -> bool {
    let ct = content_type.split(';').next().unwrap_or("").trim();
    matches!(
        ct,
        "text/html" | "text/plain" | "text/css" | "application/json"
    )
}

/// Compress data using Brotli.
/// Returns None if compression would not reduce size.
pub fn compress_brotli(data: &[u8]) -> Option<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() / 2);
    let mut input = std::io::Cursor::new(data);
    let params = brotli::enc::BrotliEncoderParams {
        quality: BROTLI_QUALITY,
        lgwin: BROTLI_WINDOW,
        ..Default::default()
    };

    match brotli::BrotliCompress(&mut input, &mut output, &params) {
        Ok(_) if output.len() < data.len() => Some(output),
        _ => None,
    }
}

/// Brotli-encode the body of a response for a client that accepts `br`.
pub fn compress_response(response: Response) -> Response {
    let eligible = response.body().len() >= MIN_COMPRESSION_SIZE
        && response.header(CONTENT_ENCODING).is_none()
        && response.content_type().is_some_and(should_compress_mime);
    if !eligible {
        return response;
    }

    match compress_brotli(response.body()) {
        Some(compressed) => response
            .with_header(CONTENT_ENCODING, HeaderValue::from_static("br"))
            .with_header(VARY, HeaderValue::from_static("Accept-Encoding"))
            .with_body(compressed),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        brotli::BrotliDecompress(&mut std::io::Cursor::new(data), &mut out).unwrap();
        out
    }

    #[test]
    fn test_should_compress_mime() {
        assert!(should_compress_mime("text/html; charset=utf-8"));
        assert!(should_compress_mime("application/json"));
        assert!(!should_compress_mime("image/png"));
        assert!(!should_compress_mime(""));
    }

    #[test]
    fn test_html_page_is_compressed() {
        let page = "<li>Bread 1 loaf</li>".repeat(50);
        let res = compress_response(Response::html(page.clone()));

        assert_eq!(res.header(CONTENT_ENCODING), Some("br"));
        assert_eq!(res.header(VARY), Some("Accept-Encoding"));
        assert!(res.body().len() < page.len());
        assert_eq!(decompress(res.body()), page.as_bytes());
    }

    #[test]
    fn test_small_body_untouched() {
        let res = compress_response(Response::html("<p>hi</p>"));
        assert!(res.header(CONTENT_ENCODING).is_none());
        assert_eq!(res.body().as_ref(), b"<p>hi</p>");
    }
}
