//! Configuration error types.

use std::fmt;

/// Error raised while loading configuration from the environment.
#[derive(Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed into the expected type.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// A variable is required because a related one was set (e.g. `TLS_KEY` with `TLS_CERT`).
    Missing { key: String, required_by: String },
    /// A variable parsed but is outside the accepted range or set of values.
    Invalid { key: String, message: String },
    /// A file named by a variable could not be read.
    Io { path: String, error: std::io::Error },
}

impl ConfigError {
    /// Name of the environment variable this error is about.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Parse { key, .. }
            | ConfigError::Missing { key, .. }
            | ConfigError::Invalid { key, .. } => key,
            ConfigError::Io { path, .. } => path,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Missing { key, required_by } => {
                write!(f, "{} must be set when {} is set", key, required_by)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
            ConfigError::Io { path, error } => {
                write!(f, "cannot read '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_both_variables() {
        let err = ConfigError::Missing {
            key: "TLS_KEY".into(),
            required_by: "TLS_CERT".into(),
        };
        assert_eq!(err.key(), "TLS_KEY");
        assert_eq!(err.to_string(), "TLS_KEY must be set when TLS_CERT is set");
    }

    #[test]
    fn test_io_has_source() {
        use std::error::Error as _;

        let err = ConfigError::Io {
            path: "/nope/cert.pem".into(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("cannot read '/nope/cert.pem'"));
    }
}
