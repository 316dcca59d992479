//! Session cookie configuration.

use std::time::Duration;

use super::parse::{env_bool, env_duration, env_or};
use super::ConfigError;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Cookie carrying the session token.
    pub cookie_name: String,
    /// Lifetime of a session from login.
    pub ttl: Duration,
    /// Add `Secure` to the cookie (set when served over HTTPS).
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "__session".into(),
            ttl: Duration::from_secs(7 * 86400),
            secure: false,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cookie_name = env_or("SESSION_COOKIE", "__session");
        let valid_name = !cookie_name.is_empty()
            && cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid_name {
            return Err(ConfigError::Invalid {
                key: "SESSION_COOKIE".into(),
                message: format!("'{}' is not a valid cookie name", cookie_name),
            });
        }

        let ttl = env_duration("SESSION_TTL", "7d")?.ok_or_else(|| ConfigError::Invalid {
            key: "SESSION_TTL".into(),
            message: "sessions cannot be disabled".into(),
        })?;

        Ok(Self {
            cookie_name,
            ttl,
            secure: env_bool("SESSION_SECURE", false),
        })
    }
}
