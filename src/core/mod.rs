//! Core types for HTTP request/response handling.
//!
//! - [`Request`] - buffered HTTP request with form, cookie and content negotiation helpers
//! - [`Response`] - HTTP response with builder pattern
//! - [`Error`] - errors a handler can fail with, each mapped to a status code
//!
//! ```rust,ignore
//! use pantry::core::{Request, Response};
//!
//! async fn handle(req: &Request) -> pantry::core::Result<Response> {
//!     let form = req.form().await?;
//!     Ok(Response::see_other(&format!("/notes?title={}", form.get("title").unwrap_or(""))))
//! }
//! ```

mod error;
mod request;
mod response;

pub use error::{Error, Result};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
