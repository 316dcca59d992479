//! Core error types.

use std::fmt;

use http::StatusCode;

use crate::store::StoreError;

/// Errors a request handler can fail with.
///
/// Validation failures are not errors at this level: handlers turn a
/// [`FieldError`](crate::form::FieldError) into a 400 response themselves.
#[derive(Debug)]
pub enum Error {
    /// Malformed request (bad body encoding, unsupported content type).
    InvalidRequest(String),

    /// Body exceeded the configured limit.
    PayloadTooLarge { limit: usize },

    /// Persistence failure.
    Store(StoreError),

    /// I/O error.
    Io(std::io::Error),

    /// HTTP error.
    Http(http::Error),

    /// Password hashing failure.
    Password(bcrypt::BcryptError),

    /// Custom error with message.
    Custom(String),
}

impl Error {
    /// Status code sent to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Store(_)
            | Error::Io(_)
            | Error::Http(_)
            | Error::Password(_)
            | Error::Custom(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            Error::PayloadTooLarge { limit } => {
                write!(f, "request body exceeds {} bytes", limit)
            }
            Error::Store(e) => write!(f, "store error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Password(e) => write!(f, "password hashing error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Password(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::Http(e)
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(e: bcrypt::BcryptError) -> Self {
        Error::Password(e)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Custom(msg)
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
