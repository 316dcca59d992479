//! Default bodies for error responses.
//!
//! Handlers return 4xx/5xx responses with an empty body when they have
//! nothing specific to say; the connection layer fills them in here. HTML
//! clients get a small page in the site layout, everyone else the reason
//! phrase as plain text.

use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;

use crate::core::Response;
use crate::views;

/// Human-readable text like "Not Found" for 404, "Bad Gateway" for 502.
#[inline]
pub fn status_reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Error")
}

/// HTML page for an error status.
pub fn error_page(status: StatusCode) -> String {
    let reason = status_reason_phrase(status);
    let content = format!(
        "<h2>{}</h2>\n<p>{}</p>\n<p><a href=\"/\">Back to the pantry</a></p>",
        status.as_u16(),
        reason
    );
    views::layout(reason, false, &content)
}

/// Give an empty-bodied 4xx/5xx response a body. Anything else passes through.
pub fn fill_error_body(response: Response, accepts_html: bool) -> Response {
    let status = response.status();
    if !response.is_error() || !response.body().is_empty() {
        return response;
    }

    if accepts_html {
        response
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )
            .with_body(error_page(status))
    } else {
        response
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(status_reason_phrase(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrase() {
        assert_eq!(status_reason_phrase(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(
            status_reason_phrase(StatusCode::PAYLOAD_TOO_LARGE),
            "Payload Too Large"
        );
        assert_eq!(status_reason_phrase(StatusCode::from_u16(599).unwrap()), "Error");
    }

    #[test]
    fn test_fill_for_html_client() {
        let res = fill_error_body(Response::not_found(), true);
        assert_eq!(res.content_type(), Some("text/html; charset=utf-8"));
        let body = String::from_utf8_lossy(res.body());
        assert!(body.contains("<h2>404</h2>"));
        assert!(body.contains("Not Found"));
    }

    #[test]
    fn test_fill_for_other_clients() {
        let res = fill_error_body(Response::gateway_timeout(), false);
        assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(res.body().as_ref(), b"Gateway Timeout");
    }

    #[test]
    fn test_existing_body_is_kept() {
        let page = Response::html_with_status(StatusCode::NOT_FOUND, "Recipe not found");
        let res = fill_error_body(page, true);
        assert_eq!(res.body().as_ref(), b"Recipe not found");

        let ok = fill_error_body(Response::empty(StatusCode::SEE_OTHER), true);
        assert!(ok.body().is_empty());
    }
}
