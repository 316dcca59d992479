//! Transport behaviour: internal endpoints, limits, HEAD, compression.

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await;
    let resp = server.internal_get("/health").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");
    let json = json_body(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "sqlite");
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let server = TestServer::start().await;
    server.get("/").await;

    let resp = server.internal_get("/metrics").await;
    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("pantry_http_requests_total"));
    assert!(body.contains("route=\"index\""));
}

#[tokio::test]
async fn test_unknown_path_gets_error_page() {
    let server = TestServer::start().await;

    let resp = server
        .get_with_headers("/nope", &[("Accept", "text/html")])
        .await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_body_contains(resp, "Not Found").await;

    let resp = server.post_form("/nope", &[]).await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    assert!(resp.headers().get("allow").is_none());
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = TestServer::start().await;
    let resp = server.post_form("/recipes", &[]).await;

    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);
    assert_header(&resp, "allow", "GET, HEAD");
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let server = TestServer::start_with(|config| config.with_max_body_size(64)).await;

    let long = "x".repeat(200);
    let resp = server.post_form("/join", &[("email", long.as_str())]).await;
    assert_status(&resp, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_head_has_no_body() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .head(server.url("/"))
        .send()
        .await
        .unwrap();

    assert_status(&resp, StatusCode::OK);
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start().await;
    let resp = server
        .get_with_headers("/", &[("X-Request-ID", "trace-42")])
        .await;
    assert_header(&resp, "x-request-id", "trace-42");
}

#[tokio::test]
async fn test_brotli_when_accepted() {
    let server = TestServer::start().await;
    let resp = server
        .get_with_headers("/join", &[("Accept-Encoding", "br")])
        .await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-encoding", "br");
    assert_header(&resp, "vary", "Accept-Encoding");

    let compressed = resp.bytes().await.unwrap();
    let mut html = Vec::new();
    brotli::BrotliDecompress(&mut std::io::Cursor::new(&compressed[..]), &mut html).unwrap();
    assert!(String::from_utf8(html).unwrap().contains("<form"));
}

#[tokio::test]
async fn test_graceful_shutdown_drains() {
    let server = TestServer::start().await;
    server.get("/").await;

    server.shutdown();
    assert!(server.drain(std::time::Duration::from_secs(5)).await);
}
