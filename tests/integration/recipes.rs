//! Recipe pages: create, validation errors, detail, delete.

use crate::helpers::*;
use reqwest::StatusCode;

const TOAST: &[(&str, &str)] = &[
    ("name", "Toast"),
    ("linkUrl", "https://example.com/toast"),
    ("ingredient", "Bread"),
    ("quantity", "1"),
    ("unit", "loaf"),
    ("ingredient", "Butter"),
    ("quantity", "20"),
    ("unit", "grams"),
];

#[tokio::test]
async fn test_create_recipe_and_show_it() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let path = server.create_recipe(TOAST).await;
    assert!(path.starts_with("/recipes/"));

    let resp = server.get(&path).await;
    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Toast"));
    assert!(body.contains("Bread 1 loaf"));
    assert!(body.contains("Butter 20 grams"));

    let resp = server.get("/recipes").await;
    assert_body_contains(resp, &format!("href=\"{}\"", path)).await;
}

#[tokio::test]
async fn test_missing_name_rerenders_form() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server
        .post_form(
            "/recipes/new",
            &[("name", ""), ("ingredient", "Bread"), ("quantity", "1"), ("unit", "loaf")],
        )
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Name is required"));
    // Entered rows survive the round trip
    assert!(body.contains("value=\"Bread\""));
}

#[tokio::test]
async fn test_non_numeric_quantity() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server
        .post_form(
            "/recipes/new",
            &[("name", "Toast"), ("ingredient", "Bread"), ("quantity", "abc"), ("unit", "loaf")],
        )
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    assert_body_contains(resp, "Quantities must be numbers").await;
}

#[tokio::test]
async fn test_recipe_without_ingredients() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server.post_form("/recipes/new", &[("name", "Air")]).await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    assert_body_contains(resp, "ingredient name must be set").await;
}

#[tokio::test]
async fn test_json_client_gets_field_errors() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server
        .post_form_json(
            "/recipes/new",
            &[("name", "Toast"), ("ingredient", "Bread"), ("quantity", "1")],
        )
        .await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    assert_header_starts_with(&resp, "content-type", "application/json");

    let json = json_body(resp).await;
    assert_eq!(
        json["errors"]["units"],
        "At least 1 ingredient must be defined"
    );
}

#[tokio::test]
async fn test_new_recipe_form_is_prefilled_from_query() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server.get("/recipes/new?name=Soup&ingredient=Leek").await;
    assert_status(&resp, StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("value=\"Soup\""));
    assert!(body.contains("value=\"Leek\""));
}

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login() {
    let server = TestServer::start().await;

    let resp = server.get("/recipes/new").await;
    assert_status(&resp, StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?redirectTo=%2Frecipes%2Fnew");

    let resp = server.post_form("/recipes/new", TOAST).await;
    assert_status(&resp, StatusCode::FOUND);
}

#[tokio::test]
async fn test_unknown_recipe_is_404() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;

    let resp = server.get("/recipes/does-not-exist").await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_body_contains(resp, "Recipe not found").await;
}

#[tokio::test]
async fn test_recipes_are_private_to_their_owner() {
    let server = TestServer::start().await;
    server.sign_up("owner@example.com").await;
    let path = server.create_recipe(TOAST).await;

    let other = TestServer::client();
    let resp = other
        .post(server.url("/join"))
        .form(&[("email", "other@example.com"), ("password", "correct horse")])
        .send()
        .await
        .unwrap();
    assert_status(&resp, StatusCode::SEE_OTHER);

    let resp = other.get(server.url(&path)).send().await.unwrap();
    assert_status(&resp, StatusCode::NOT_FOUND);

    let resp = other.get(server.url("/recipes")).send().await.unwrap();
    assert_body_contains(resp, "No recipes yet").await;
}

#[tokio::test]
async fn test_delete_recipe() {
    let server = TestServer::start().await;
    server.sign_up("cook@example.com").await;
    let path = server.create_recipe(TOAST).await;

    let resp = server.post_form(&path, &[]).await;
    assert_status(&resp, StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/recipes");

    let resp = server.get(&path).await;
    assert_status(&resp, StatusCode::NOT_FOUND);
}
