//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// tracing-subscriber's human-readable format.
    Pretty,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Directive string for `EnvFilter`.
    pub filter: String,
    pub format: LogFormat,
    /// Service name written to every JSON line.
    pub service_name: String,
}

impl LoggingConfig {
    /// Priority: LOG_LEVEL > RUST_LOG > `pantry=info`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("LOG_FORMAT", "json").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("expected json or pretty, got '{}'", other),
                })
            }
        };

        Ok(Self {
            filter: resolve_filter(
                std::env::var("LOG_LEVEL").ok().as_deref(),
                std::env::var("RUST_LOG").ok().as_deref(),
            ),
            format,
            service_name: env_or("SERVICE_NAME", "pantry"),
        })
    }
}

/// LOG_LEVEL takes a bare level scoped to this crate; RUST_LOG is passed through
/// as full filter syntax. An unknown LOG_LEVEL is ignored.
fn resolve_filter(log_level: Option<&str>, rust_log: Option<&str>) -> String {
    if let Some(level) = log_level.map(str::to_lowercase) {
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                return format!("pantry={}", level);
            }
            _ => eprintln!(
                "Warning: ignoring LOG_LEVEL '{}' (expected trace, debug, info, warn or error)",
                level
            ),
        }
    }

    match rust_log {
        Some(filter) if !filter.is_empty() => filter.to_string(),
        _ => "pantry=info".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_priority() {
        assert_eq!(resolve_filter(None, None), "pantry=info");
        assert_eq!(
            resolve_filter(None, Some("pantry=warn,sqlx=debug")),
            "pantry=warn,sqlx=debug"
        );
        assert_eq!(
            resolve_filter(Some("DEBUG"), Some("pantry=warn")),
            "pantry=debug"
        );
        assert_eq!(resolve_filter(Some("loud"), Some("hyper=warn")), "hyper=warn");
    }
}
