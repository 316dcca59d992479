//! Note pages.

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_create_and_list_notes() {
    let server = TestServer::start().await;
    server.sign_up("writer@example.com").await;

    let resp = server.get("/notes").await;
    assert_body_contains(resp, "No notes yet").await;

    let resp = server
        .post_form("/notes/new", &[("title", "Shopping"), ("body", "eggs & milk")])
        .await;
    assert_status(&resp, StatusCode::SEE_OTHER);
    let path = location(&resp);

    let resp = server.get(&path).await;
    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Shopping"));
    assert!(body.contains("eggs &amp; milk"));

    let resp = server.get("/notes").await;
    assert_body_contains(resp, "Shopping").await;
}

#[tokio::test]
async fn test_note_requires_title_and_body() {
    let server = TestServer::start().await;
    server.sign_up("writer@example.com").await;

    let resp = server
        .post_form("/notes/new", &[("title", ""), ("body", "text")])
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    assert_body_contains(resp, "Title is required").await;

    let resp = server
        .post_form_json("/notes/new", &[("title", "Shopping"), ("body", "")])
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["errors"]["body"], "Body is required");
}

#[tokio::test]
async fn test_delete_note() {
    let server = TestServer::start().await;
    server.sign_up("writer@example.com").await;

    let resp = server
        .post_form("/notes/new", &[("title", "Temp"), ("body", "gone soon")])
        .await;
    let path = location(&resp);

    let resp = server.post_form(&path, &[]).await;
    assert_status(&resp, StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/notes");

    let resp = server.get(&path).await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_body_contains(resp, "Note not found").await;
}
