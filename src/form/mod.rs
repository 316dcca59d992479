//! Submitted form fields and field-level validation errors.
//!
//! [`FormData`] is what both the query string of a GET and the body of a POST
//! decode into: an ordered multi-map where repeated keys keep every value in
//! submission order.

mod multipart;
mod parser;

use std::fmt;

use bytes::Bytes;

use crate::core::{Error, Result};

pub use parser::{parse_cookies, parse_urlencoded};

/// Ordered multi-map of submitted `(key, value)` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` string (a query string or a body).
    pub fn from_query(query: &str) -> Self {
        Self {
            pairs: parse_urlencoded(query),
        }
    }

    /// Decode a request body according to its content type.
    ///
    /// An empty body is an empty form whatever the content type says.
    pub async fn from_body(content_type: Option<&str>, body: Bytes) -> Result<Self> {
        if body.is_empty() {
            return Ok(Self::new());
        }

        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match essence.as_str() {
            "application/x-www-form-urlencoded" => {
                let text = std::str::from_utf8(&body).map_err(|_| {
                    Error::InvalidRequest("form body is not valid UTF-8".to_string())
                })?;
                Ok(Self::from_query(text))
            }
            "multipart/form-data" => {
                let content_type = content_type.unwrap_or_default();
                let pairs = multipart::parse_multipart(content_type, body)
                    .await
                    .map_err(Error::InvalidRequest)?;
                Ok(Self { pairs })
            }
            "" => Err(Error::InvalidRequest(
                "missing content type for form body".to_string(),
            )),
            other => Err(Error::InvalidRequest(format!(
                "unsupported form content type: {}",
                other
            ))),
        }
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in submission order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Number of pairs (not distinct keys).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Form field a validation message is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    LinkUrl,
    Ingredients,
    Quantities,
    Units,
    Title,
    Body,
    Email,
    Password,
}

impl Field {
    /// Key used in error payloads and `aria-errormessage` ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::LinkUrl => "linkUrl",
            Field::Ingredients => "ingredients",
            Field::Quantities => "quantities",
            Field::Units => "units",
            Field::Title => "title",
            Field::Body => "body",
            Field::Email => "email",
            Field::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one validation failure reported for a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    pub const fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }

    /// `{"errors":{"<field>":"<message>"}}`
    pub fn to_json(&self) -> serde_json::Value {
        let mut errors = serde_json::Map::new();
        errors.insert(self.field.as_str().to_string(), self.message.into());
        serde_json::json!({ "errors": errors })
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}
