//! End-to-end tests for pantry.
//!
//! Each test starts its own server on an ephemeral port, backed by an
//! in-memory SQLite database, and talks to it over real HTTP.

mod helpers;

mod auth;
mod notes;
mod recipes;
mod server;
