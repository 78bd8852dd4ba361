//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CATALOG_SOURCE` - Product source, `public` or `erp` (default: public)
//! - `CATALOG_API_URL` - Public catalog endpoint (default: <https://fakestoreapi.com/products>)
//! - `ERP_API_URL` - ERP base URL, also used to resolve relative image paths
//! - `ERP_API_KEY` - ERP API key
//! - `ERP_API_SECRET` - ERP API secret
//! - `ERP_PAGE_LENGTH` - Items requested from the ERP (default: 100)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//!
//! The ERP variables are only needed when `CATALOG_SOURCE=erp`, and even then
//! their absence does not stop the server: the product grid reports the
//! missing configuration instead of attempting a request.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Fewest distinct characters a secret may use.
///
/// ERP secrets are 15 hex characters and often repeat some; this only
/// catches degenerate values like `aaaaaaaa` or `12121212`.
const MIN_DISTINCT_CHARS: usize = 4;

/// Default public catalog endpoint.
pub const DEFAULT_CATALOG_API_URL: &str = "https://fakestoreapi.com/products";

/// Default number of items requested from the ERP.
pub const DEFAULT_ERP_PAGE_LENGTH: u32 = 100;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Product catalog configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Which catalog backend serves the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSourceKind {
    /// Public storefront API returning a plain JSON array.
    #[default]
    Public,
    /// ERP item list behind token authentication.
    Erp,
}

impl FromStr for CatalogSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "erp" => Ok(Self::Erp),
            other => Err(format!("expected 'public' or 'erp', got '{other}'")),
        }
    }
}

/// Product catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Selected source
    pub source: CatalogSourceKind,
    /// Public catalog endpoint
    pub public_api_url: String,
    /// ERP connection settings
    pub erp: ErpConfig,
}

/// ERP API configuration.
///
/// Every field is optional so that a missing value surfaces as a catalog
/// error at fetch time rather than a startup failure.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone, Default)]
pub struct ErpConfig {
    /// ERP base URL (e.g., <https://erp.example.com>)
    pub api_url: Option<String>,
    /// ERP API key
    pub api_key: Option<String>,
    /// ERP API secret
    pub api_secret: Option<SecretString>,
    /// `limit_page_length` sent with list requests
    pub page_length: u32,
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key)
            .field(
                "api_secret",
                &self.api_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("page_length", &self.page_length)
            .finish()
    }
}

/// A complete set of ERP credentials.
#[derive(Clone)]
pub struct ErpCredentials {
    /// ERP base URL without trailing slash
    pub api_url: String,
    /// ERP API key
    pub api_key: String,
    /// ERP API secret
    pub api_secret: SecretString,
}

impl ErpConfig {
    /// Return the credentials if all three values are present and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<ErpCredentials> {
        let api_url = self.api_url.as_deref().filter(|v| !v.is_empty())?;
        let api_key = self.api_key.as_deref().filter(|v| !v.is_empty())?;
        let api_secret = self
            .api_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())?;

        Some(ErpCredentials {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.clone(),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if a supplied ERP secret fails validation (placeholder detection,
    /// distinct-character check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_env(env, "STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env(env, "STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env(env, "STOREFRONT_BASE_URL")?;

        let catalog = CatalogConfig::from_lookup(env)?;

        Ok(Self {
            host,
            port,
            base_url,
            catalog,
            sentry_dsn: get_optional_env(env, "SENTRY_DSN"),
            sentry_environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env(env, "SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env(env, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CatalogConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source = parse_env(env, "CATALOG_SOURCE", "public")?;
        let public_api_url = get_env_or_default(env, "CATALOG_API_URL", DEFAULT_CATALOG_API_URL);

        let api_secret = get_optional_env(env, "ERP_API_SECRET")
            .map(|value| {
                validate_secret_strength(&value, "ERP_API_SECRET")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        let erp = ErpConfig {
            api_url: get_optional_env(env, "ERP_API_URL"),
            api_key: get_optional_env(env, "ERP_API_KEY"),
            api_secret,
            page_length: parse_env(
                env,
                "ERP_PAGE_LENGTH",
                &DEFAULT_ERP_PAGE_LENGTH.to_string(),
            )?,
        };

        Ok(Self {
            source,
            public_api_url,
            erp,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::Public,
            public_api_url: DEFAULT_CATALOG_API_URL.to_string(),
            erp: ErpConfig {
                page_length: DEFAULT_ERP_PAGE_LENGTH,
                ..ErpConfig::default()
            },
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as absent.
fn get_optional_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(env, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret is not a placeholder or a degenerate value.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let distinct = secret.chars().collect::<HashSet<_>>().len();
    if distinct < MIN_DISTINCT_CHARS {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "too few distinct characters ({distinct}, need >= {MIN_DISTINCT_CHARS}). Use the secret generated by the ERP."
            ),
        ));
    }

    Ok(())
}
