//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin console
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `BACKEND_API_URL` - CMS backend API root (default: <https://api.shodhsutra.com/api>)
//! - `BACKEND_ASSET_URL` - Host that serves uploaded images (default: <https://api.shodhsutra.com>)
//! - `BACKEND_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 30)
//! - `COLLECTION_MAX_AGE_SECS` - How long a fetched list is reused (default: 300)
//! - `UPLOAD_LIMIT_BYTES` - Largest accepted request body (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_API_URL: &str = "https://api.shodhsutra.com/api";
const DEFAULT_BACKEND_ASSET_URL: &str = "https://api.shodhsutra.com";
const DEFAULT_UPLOAD_LIMIT_BYTES: &str = "10485760";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin console
    pub base_url: String,
    /// CMS backend connection settings
    pub backend: BackendConfig,
    /// Maximum age of a fetched collection before it is reloaded
    pub collection_max_age: Duration,
    /// Largest request body accepted (image uploads)
    pub upload_limit_bytes: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// CMS backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API root, e.g. `https://api.shodhsutra.com/api`. No trailing slash.
    pub api_url: String,
    /// Asset host that gallery paths are appended to. No trailing slash.
    pub asset_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Load backend settings from environment.
    ///
    /// Shared with the CLI, which talks to the same backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for a malformed URL or timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_url("BACKEND_API_URL", DEFAULT_BACKEND_API_URL)?;
        let asset_url = get_url("BACKEND_ASSET_URL", DEFAULT_BACKEND_ASSET_URL)?;
        let timeout = get_seconds("BACKEND_TIMEOUT_SECS", "30")?;

        Ok(Self {
            api_url,
            asset_url,
            timeout,
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        validate_url("ADMIN_BASE_URL", &base_url)?;

        let backend = BackendConfig::from_env()?;
        let collection_max_age = get_seconds("COLLECTION_MAX_AGE_SECS", "300")?;
        let upload_limit_bytes = get_env_or_default("UPLOAD_LIMIT_BYTES", DEFAULT_UPLOAD_LIMIT_BYTES)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar("UPLOAD_LIMIT_BYTES".to_string(), e.to_string()))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            collection_max_age,
            upload_limit_bytes,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a URL variable, validated and stripped of any trailing slash.
fn get_url(key: &str, default: &str) -> Result<String, ConfigError> {
    let value = get_env_or_default(key, default);
    validate_url(key, &value)?;
    Ok(value.trim_end_matches('/').to_string())
}

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Get a whole number of seconds as a `Duration`.
fn get_seconds(key: &str, default: &str) -> Result<Duration, ConfigError> {
    get_env_or_default(key, default)
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> AdminConfig {
        AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: base_url.to_string(),
            backend: BackendConfig {
                api_url: DEFAULT_BACKEND_API_URL.to_string(),
                asset_url: DEFAULT_BACKEND_ASSET_URL.to_string(),
                timeout: Duration::from_secs(30),
            },
            collection_max_age: Duration::from_secs(300),
            upload_limit_bytes: 10 * 1024 * 1024,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("http://localhost:3001");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
    }

    #[test]
    fn test_secure_cookies_follow_base_url() {
        assert!(!test_config("http://localhost:3001").secure_cookies());
        assert!(test_config("https://admin.shodhsutra.com").secure_cookies());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("X", "https://api.shodhsutra.com/api").is_ok());
        assert!(validate_url("X", "http://127.0.0.1:4000").is_ok());
        assert!(matches!(
            validate_url("X", "not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            validate_url("X", "ftp://files.example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}
