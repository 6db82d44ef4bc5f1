//! Console configuration.
//!
//! Base URLs for the licensing backend and the package download host, plus
//! the HTTP timeout. Defaults target a local development backend. Override
//! via environment variables or explicit construction for staging/testing.
//!
//! The access token is not part of the configuration; it lives in the
//! [`SessionStore`](crate::session::SessionStore) and is read per request.

use url::Url;
use vtp_license::package::DEFAULT_DOWNLOAD_BASE;

/// Default licensing backend.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base URL of the licensing REST backend.
    pub api_url: Url,
    /// Base URL packages are downloaded from.
    pub download_base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VTP_API_URL` (default: `http://localhost:3000`)
    /// - `VTP_DOWNLOAD_BASE_URL` (default: `https://downloads.visittrackingpro.com`)
    /// - `VTP_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = match lookup("VTP_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            api_url: lookup_url(&lookup, "VTP_API_URL", DEFAULT_API_URL)?,
            download_base_url: lookup_url(
                &lookup,
                "VTP_DOWNLOAD_BASE_URL",
                DEFAULT_DOWNLOAD_BASE,
            )?,
            timeout_secs,
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        let make_url = |raw: String| -> Result<Url, ConfigError> {
            Url::parse(&raw)
                .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))
        };
        Ok(Self {
            api_url: make_url(format!("http://127.0.0.1:{port}"))?,
            download_base_url: make_url(format!("http://127.0.0.1:{port}/downloads"))?,
            timeout_secs: 5,
        })
    }
}

fn lookup_url(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = lookup(var).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("VTP_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
}
