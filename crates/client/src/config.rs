//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIRANA_API_BASE` - Base URL of the storefront REST API
//!   (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `KIRANA_SESSION_FILE` - Path of the persisted session file
//!   (default: `.kirana-session.json`)
//! - `KIRANA_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds
//!   (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_FILE: &str = ".kirana-session.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront REST API
    pub api_base: Url,
    /// Path of the persisted session file (tokens, last order id)
    pub session_file: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
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

        let api_base = parse_base_url("KIRANA_API_BASE", &get_required_env("KIRANA_API_BASE")?)?;
        let session_file =
            PathBuf::from(get_env_or_default("KIRANA_SESSION_FILE", DEFAULT_SESSION_FILE));
        let request_timeout = parse_timeout_secs(
            "KIRANA_REQUEST_TIMEOUT_SECS",
            &get_env_or_default("KIRANA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        )?;

        Ok(Self {
            api_base,
            session_file,
            request_timeout,
        })
    }

    /// Create a configuration directly, for embedding shells and tests.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not a valid http(s) URL.
    pub fn new(api_base: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: parse_base_url("api_base", api_base)?,
            session_file: session_file.into(),
            request_timeout: Duration::from_secs(30),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate an API base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

/// Parse a timeout value in whole seconds.
fn parse_timeout_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "timeout must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
