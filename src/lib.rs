//! pantry - recipe and note keeping web application.
//!
//! Signed-in users keep recipes (a name plus ingredient rows of name,
//! quantity and unit) and free-form notes. Pages are server-rendered HTML
//! forms; every form also answers JSON clients with field errors.
//!
//! # Architecture
//!
//! - [`server`] - HTTP/1.1 + HTTP/2 listener, TLS, graceful shutdown
//! - [`app`] - routing and page handlers behind [`server::Handler`]
//! - [`form`] / [`recipe`] / [`note`] - form decoding and validation
//! - [`store`] - persistence behind the [`store::Store`] trait (SQLite)
//! - [`views`] - HTML rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pantry::{App, Config, Server};
//! use pantry::metrics::Metrics;
//! use pantry::store::SqliteStore;
//!
//! let config = Config::from_env()?;
//! let store = Arc::new(SqliteStore::connect(&config.database.url, 5).await?);
//! let metrics = Arc::new(Metrics::new()?);
//! let app = App::new(store, config.session.clone(), Arc::clone(&metrics));
//! let server = Server::bind(config.server, app, metrics).await?;
//! server.run().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod app;
pub mod auth;
pub mod config;
pub mod core;
pub mod form;
pub mod logging;
pub mod metrics;
pub mod note;
pub mod recipe;
pub mod server;
pub mod store;
pub mod views;

// Re-exports for convenience
pub use app::App;
pub use config::Config;
pub use server::{Handler, Server};
