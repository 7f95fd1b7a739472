//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SOFAHUB_API_BASE_URL` - REST API root (default:
//!   `https://sofahubbackend-production.up.railway.app/api`)
//! - `SOFAHUB_SESSION_FILE` - Where the cart session id is persisted
//!   (default: `.sofahub/session.json`)
//! - `SOFAHUB_CACHE_TTL_SECS` - Catalog response cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Production API root.
pub const DEFAULT_API_BASE_URL: &str = "https://sofahubbackend-production.up.railway.app/api";

const DEFAULT_SESSION_FILE: &str = ".sofahub/session.json";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// SofaHub REST API configuration
    pub api: ApiConfig,
    /// Path of the JSON file holding client-local state
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// SofaHub REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root, e.g. `https://host/api`. Endpoint paths are appended to it.
    pub base_url: Url,
    /// Lifetime of cached catalog responses
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let session_file =
            PathBuf::from(get_env_or_default("SOFAHUB_SESSION_FILE", DEFAULT_SESSION_FILE));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            api,
            session_file,
            sentry_dsn,
            sentry_environment,
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "SOFAHUB_API_BASE_URL",
            &get_env_or_default("SOFAHUB_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let cache_ttl = get_env_or_default("SOFAHUB_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOFAHUB_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            cache_ttl,
        })
    }

    /// Configuration pointing at an arbitrary API root with the default
    /// cache lifetime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            cache_ttl: Duration::from_secs(300),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and normalize an API root URL.
///
/// The trailing slash is stripped so endpoint paths (which all start with
/// `/`) can be appended directly.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        let url = parse_base_url("TEST", "https://api.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        let result = parse_base_url("TEST", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_base_url_rejects_non_http_scheme() {
        let result = parse_base_url("TEST", "ftp://files.example.com/api");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_default_base_url_parses() {
        let config = ApiConfig::with_base_url(DEFAULT_API_BASE_URL).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_with_base_url() {
        let config = ApiConfig::with_base_url("http://127.0.0.1:8000/api/").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8000/api");
    }
}
