//! Sign up, log in, log out.

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;
    server.post_form("/logout", &[]).await;

    let resp = server
        .post_form(
            "/login",
            &[
                ("email", "cook@example.com"),
                ("password", "correct horse"),
                ("redirectTo", "/notes/new"),
            ],
        )
        .await;
    assert_status(&resp, StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/notes/new");

    let resp = server.get("/notes/new").await;
    assert_status(&resp, StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_bad_password() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;
    server.post_form("/logout", &[]).await;

    let resp = server
        .post_form(
            "/login",
            &[("email", "cook@example.com"), ("password", "wrong password")],
        )
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    assert_body_contains(resp, "Invalid email or password").await;
}

#[tokio::test]
async fn test_join_validates_credentials() {
    let server = TestServer::start().await;

    let resp = server
        .post_form_json("/join", &[("email", "not-an-email"), ("password", "long enough")])
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["errors"]["email"], "Email is invalid");

    let resp = server
        .post_form("/join", &[("email", "cook@example.com"), ("password", "short")])
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server.get("/recipes").await;
    assert_status(&resp, StatusCode::OK);

    let resp = server.post_form("/logout", &[]).await;
    assert_status(&resp, StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = server.get("/recipes").await;
    assert_status(&resp, StatusCode::FOUND);
}
