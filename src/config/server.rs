//! HTTP server configuration.

use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_rustls::rustls::pki_types::CertificateDer;
use tokio_rustls::rustls::ServerConfig as RustlsConfig;

use super::parse::{env_bool, env_duration, env_opt, env_parse};
use super::ConfigError;

/// Duration that can be switched off ("off" / "0").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionalDuration(pub Option<Duration>);

impl OptionalDuration {
    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        Self(Some(Duration::from_secs(secs)))
    }

    #[inline]
    pub fn off() -> Self {
        Self(None)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn as_secs(&self) -> u64 {
        self.0.map(|d| d.as_secs()).unwrap_or(0)
    }

    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        self.0
    }
}

/// TLS certificate and key paths (PEM).
#[derive(Clone, Debug, Default)]
pub struct TlsConfig {
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

impl TlsConfig {
    /// Check if TLS is configured.
    pub fn is_enabled(&self) -> bool {
        self.cert_path.is_some() && self.key_path.is_some()
    }

    /// Load from environment variables. Setting only one of the pair is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cert_path = env_opt("TLS_CERT").map(PathBuf::from);
        let key_path = env_opt("TLS_KEY").map(PathBuf::from);

        match (&cert_path, &key_path) {
            (Some(_), None) => Err(ConfigError::Missing {
                key: "TLS_KEY".into(),
                required_by: "TLS_CERT".into(),
            }),
            (None, Some(_)) => Err(ConfigError::Missing {
                key: "TLS_CERT".into(),
                required_by: "TLS_KEY".into(),
            }),
            _ => Ok(Self {
                cert_path,
                key_path,
            }),
        }
    }

    /// Read the certificate chain and private key and build a rustls config
    /// advertising HTTP/2 and HTTP/1.1 over ALPN.
    pub fn load(&self) -> Result<Option<RustlsConfig>, ConfigError> {
        let (Some(cert_path), Some(key_path)) = (&self.cert_path, &self.key_path) else {
            return Ok(None);
        };

        let io_err = |path: &PathBuf, error: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            error,
        };

        let cert_file = std::fs::File::open(cert_path).map_err(|e| io_err(cert_path, e))?;
        let certs: Vec<CertificateDer<'static>> =
            rustls_pemfile::certs(&mut BufReader::new(cert_file))
                .filter_map(|r| r.ok())
                .collect();

        if certs.is_empty() {
            return Err(ConfigError::Invalid {
                key: "TLS_CERT".into(),
                message: "no certificates found".into(),
            });
        }

        let key_file = std::fs::File::open(key_path).map_err(|e| io_err(key_path, e))?;
        let key = rustls_pemfile::private_key(&mut BufReader::new(key_file))
            .map_err(|e| io_err(key_path, e))?
            .ok_or_else(|| ConfigError::Invalid {
                key: "TLS_KEY".into(),
                message: "no private key found".into(),
            })?;

        let invalid = |e: rustls::Error| ConfigError::Invalid {
            key: "TLS_CERT".into(),
            message: e.to_string(),
        };

        // Pin the ring provider so the choice doesn't depend on crate features elsewhere
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut tls_config = RustlsConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(invalid)?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(invalid)?;

        tls_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        Ok(Some(tls_config))
    }
}

/// Server configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `LISTEN_ADDR` | `0.0.0.0:8080` | Server bind address |
/// | `INTERNAL_ADDR` | _(empty)_ | `/health` and `/metrics` listener |
/// | `DRAIN_TIMEOUT_SECS` | `30` | Graceful shutdown timeout |
/// | `REQUEST_TIMEOUT` | `30s` | Per-request deadline (`off` disables) |
/// | `HEADER_TIMEOUT_SECS` | `5` | Time allowed to send request headers |
/// | `MAX_BODY_SIZE` | `1048576` | Largest accepted request body in bytes |
/// | `ACCESS_LOG` | `0` | One JSON line per request |
/// | `TLS_CERT` / `TLS_KEY` | _(empty)_ | PEM paths, both required for HTTPS |
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub internal_addr: Option<SocketAddr>,
    pub drain_timeout: Duration,
    pub request_timeout: OptionalDuration,
    pub header_timeout: Duration,
    pub max_body_size: usize,
    pub access_log: bool,
    pub tls: TlsConfig,
}

impl ServerConfig {
    /// Configuration with defaults bound to `addr`.
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            internal_addr: None,
            drain_timeout: Duration::from_secs(30),
            request_timeout: OptionalDuration::from_secs(30),
            header_timeout: Duration::from_secs(5),
            max_body_size: 1024 * 1024,
            access_log: false,
            tls: TlsConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr: SocketAddr = env_parse("LISTEN_ADDR", ([0, 0, 0, 0], 8080).into())?;

        let internal_addr = env_opt("INTERNAL_ADDR")
            .map(|s| {
                s.parse::<SocketAddr>().map_err(|e| ConfigError::Parse {
                    key: "INTERNAL_ADDR".into(),
                    value: s,
                    error: e.to_string(),
                })
            })
            .transpose()?;

        let max_body_size: usize = env_parse("MAX_BODY_SIZE", 1024 * 1024)?;
        if max_body_size == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_BODY_SIZE".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            listen_addr,
            internal_addr,
            drain_timeout: Duration::from_secs(env_parse("DRAIN_TIMEOUT_SECS", 30)?),
            request_timeout: OptionalDuration(env_duration("REQUEST_TIMEOUT", "30s")?),
            header_timeout: Duration::from_secs(env_parse("HEADER_TIMEOUT_SECS", 5)?),
            max_body_size,
            access_log: env_bool("ACCESS_LOG", false),
            tls: TlsConfig::from_env()?,
        })
    }

    pub fn with_internal_addr(mut self, addr: SocketAddr) -> Self {
        self.internal_addr = Some(addr);
        self
    }

    pub fn with_request_timeout(mut self, timeout: OptionalDuration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }

    /// Scheme the main listener serves.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_enabled() {
            "https"
        } else {
            "http"
        }
    }

    /// Value logged for the listen address (kept for `log_summary`).
    pub fn describe(&self) -> String {
        format!("{}://{}", self.scheme(), self.listen_addr)
    }
}
