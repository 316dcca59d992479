//! Test helpers and utilities

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pantry::config::{ServerConfig, SessionConfig};
use pantry::metrics::Metrics;
use pantry::store::SqliteStore;
use pantry::{App, Server};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};

/// In-process server plus a cookie-keeping client that does not follow redirects.
pub struct TestServer {
    pub base_url: String,
    pub internal_url: String,
    pub client: Client,
    server: Arc<Server<App<SqliteStore>>>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|config| config).await
    }

    /// Start with a tweaked [`ServerConfig`].
    pub async fn start_with(tweak: impl FnOnce(ServerConfig) -> ServerConfig) -> Self {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let config = tweak(ServerConfig::new(addr).with_internal_addr(addr));

        let store = SqliteStore::connect("sqlite::memory:", 1)
            .await
            .expect("Failed to open store");
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = App::new(
            Arc::new(store),
            SessionConfig::default(),
            Arc::clone(&metrics),
        );

        let server = Arc::new(
            Server::bind(config, app, metrics)
                .await
                .expect("Failed to bind"),
        );
        let base_url = format!("http://{}", server.local_addr().unwrap());
        let internal_url = format!("http://{}", server.internal_addr().unwrap());

        let running = Arc::clone(&server);
        tokio::spawn(async move {
            let _ = running.run().await;
        });

        Self {
            base_url,
            internal_url,
            client: Self::client(),
            server,
        }
    }

    /// A fresh client with its own cookie jar.
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response {
        let mut req = self.client.get(self.url(path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// POST a form asking for a JSON error body.
    pub async fn post_form_json(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn internal_get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.internal_url, path))
            .send()
            .await
            .expect("Internal GET request failed")
    }

    /// Register `email` and keep the session cookie in this client's jar.
    pub async fn sign_up(&self, email: &str) {
        let resp = self
            .post_form("/join", &[("email", email), ("password", "correct horse")])
            .await;
        assert_status(&resp, StatusCode::SEE_OTHER);
    }

    pub fn shutdown(&self) {
        self.server.trigger_shutdown();
    }

    /// Wait for open connections to close after [`TestServer::shutdown`].
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.server.wait_for_drain(timeout).await
    }

    /// Create a recipe and return its detail path.
    pub async fn create_recipe(&self, form: &[(&str, &str)]) -> String {
        let resp = self.post_form("/recipes/new", form).await;
        assert_status(&resp, StatusCode::SEE_OTHER);
        location(&resp)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.trigger_shutdown();
    }
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("Location header not found")
        .to_str()
        .unwrap()
        .to_string()
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}

/// Assert that response contains header with prefix
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Assert that response body contains substring
pub async fn assert_body_contains(response: Response, substring: &str) {
    let body = response.text().await.expect("Failed to read body");
    assert!(
        body.contains(substring),
        "Body does not contain '{}'. Body: {}",
        substring,
        &body[..body.len().min(500)]
    );
}

/// Parse a JSON body.
pub async fn json_body(response: Response) -> serde_json::Value {
    let text = response.text().await.expect("Failed to read body");
    serde_json::from_str(&text).expect("Body is not JSON")
}
