//! Configuration loaded from environment variables.
//!
//! ```rust,ignore
//! use pantry::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! ```

mod database;
mod error;
mod logging;
mod parse;
mod server;
mod session;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use server::{OptionalDuration, ServerConfig, TlsConfig};
pub use session::SessionConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.describe());

        if let Some(ref internal) = self.server.internal_addr {
            info!("  Internal server: {}", internal);
        }

        info!(
            "  Database: {} (max {} connections)",
            self.database.url, self.database.max_connections
        );
        if self.database.seed {
            info!("  Seeding demo data");
        }

        info!(
            "  Session cookie: {} (ttl {}s{})",
            self.session.cookie_name,
            self.session.ttl.as_secs(),
            if self.session.secure { ", secure" } else { "" }
        );

        if self.server.request_timeout.is_enabled() {
            info!(
                "  Request timeout: {}s",
                self.server.request_timeout.as_secs()
            );
        } else {
            info!("  Request timeout: disabled");
        }

        info!("  Max body size: {} bytes", self.server.max_body_size);

        if self.server.access_log {
            info!("  Access log: enabled");
        }
    }
}
