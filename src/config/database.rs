//! Database configuration.

use super::parse::{env_bool, env_or, env_parse};
use super::ConfigError;

/// SQLite connection settings.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// sqlx connection URL (`sqlite://pantry.db`, `sqlite::memory:`).
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Insert the demo user and data on startup.
    pub seed: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            seed: false,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env_or("DATABASE_URL", "sqlite://pantry.db");
        if !url.starts_with("sqlite:") {
            return Err(ConfigError::Invalid {
                key: "DATABASE_URL".into(),
                message: format!("expected a sqlite: URL, got '{}'", url),
            });
        }

        let max_connections: u32 = env_parse("DATABASE_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(Self {
            url,
            max_connections,
            seed: env_bool("SEED_DATABASE", false),
        })
    }

    /// In-memory databases vanish with their last connection.
    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_detection() {
        assert!(DatabaseConfig::new("sqlite::memory:").is_memory());
        assert!(DatabaseConfig::new("sqlite://file:x?mode=memory&cache=shared").is_memory());
        assert!(!DatabaseConfig::new("sqlite://pantry.db").is_memory());
    }

    #[test]
    fn test_rejects_foreign_scheme() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/pantry");
        let err = DatabaseConfig::from_env().unwrap_err();
        std::env::remove_var("DATABASE_URL");
        assert_eq!(err.key(), "DATABASE_URL");
    }
}
