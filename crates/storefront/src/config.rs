//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ROCKETSHOES_HOST` - Bind address (default: 127.0.0.1)
//! - `ROCKETSHOES_PORT` - Listen port (default: 3000)
//! - `ROCKETSHOES_API_URL` - Base URL of the product/stock service (default: <http://localhost:3333>)
//! - `ROCKETSHOES_API_TIMEOUT_SECS` - Per-request timeout for the service (default: 10)
//! - `ROCKETSHOES_CATALOG_CACHE_SECS` - Catalog cache TTL (default: 300)
//! - `ROCKETSHOES_STORAGE_DIR` - Directory holding the persisted cart (default: .rocketshoes)
//! - `ROCKETSHOES_CURRENCY` - ISO 4217 code used to format prices (default: BRL)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use rocketshoes_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product/stock service configuration
    pub api: ApiConfig,
    /// Directory for durable key/value storage
    pub storage_dir: PathBuf,
    /// Currency used when formatting prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Product/stock service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. <http://localhost:3333>
    pub base_url: Url,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with default timeouts.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            catalog_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parse_or("ROCKETSHOES_HOST", "127.0.0.1")?;
        let port = env.parse_or("ROCKETSHOES_PORT", "3000")?;
        let api = ApiConfig {
            base_url: parse_api_url(&env.get_or("ROCKETSHOES_API_URL", "http://localhost:3333"))?,
            timeout: Duration::from_secs(env.parse_or("ROCKETSHOES_API_TIMEOUT_SECS", "10")?),
            catalog_cache_ttl: Duration::from_secs(
                env.parse_or("ROCKETSHOES_CATALOG_CACHE_SECS", "300")?,
            ),
        };
        let storage_dir = PathBuf::from(env.get_or("ROCKETSHOES_STORAGE_DIR", ".rocketshoes"));
        let currency = env.parse_or("ROCKETSHOES_CURRENCY", "BRL")?;

        Ok(Self {
            host,
            port,
            api,
            storage_dir,
            currency,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable with a default value.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse the service URL, accepting only http and https.
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), reason);

    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
