//! Widget configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `SHOP_CATALOG` - Catalog resource: an `http(s)://` URL or a file path
//!   (default: `crates/storefront/static/db/products.json`)
//! - `SHOP_STORAGE_DIR` - Directory backing the persistent cart store (default: `.shop-widget`)
//! - `SHOP_CART_KEY` - Storage key holding the serialized cart (default: `cart_v1`)
//! - `SHOP_MODAL_CLOSE_FALLBACK_MS` - Modal close fallback timeout (default: 350)
//! - `SHOP_STATIC_DIR` - Directory served by `serve` (default: `crates/storefront/static`)
//! - `SHOP_HOST` - Bind address for `serve` (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port for `serve` (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default catalog resource, relative to the workspace root.
pub const DEFAULT_CATALOG: &str = "crates/storefront/static/db/products.json";

/// Default storage key for the serialized cart.
pub const DEFAULT_CART_KEY: &str = "cart_v1";

/// Default modal close fallback, in milliseconds.
pub const DEFAULT_CLOSE_FALLBACK_MS: u64 = 350;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the catalog is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    /// Fetched over HTTP.
    Url(Url),
    /// Read from the local filesystem.
    Path(PathBuf),
}

impl CatalogLocation {
    /// Parse a catalog location. `http://` and `https://` values are URLs,
    /// everything else is a filesystem path.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the value looks like a URL but is malformed.
    pub fn parse(value: &str) -> Result<Self, url::ParseError> {
        let trimmed = value.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Url(Url::parse(trimmed)?))
        } else {
            Ok(Self::Path(PathBuf::from(trimmed)))
        }
    }
}

impl std::fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Storefront widget configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Catalog resource location
    pub catalog: CatalogLocation,
    /// Directory backing the file cart store
    pub storage_dir: PathBuf,
    /// Storage key for the serialized cart
    pub cart_key: String,
    /// How long `close` waits for a transition-end before hiding anyway
    pub close_fallback: Duration,
    /// Directory served by the static server
    pub static_dir: PathBuf,
    /// IP address to bind the static server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogLocation::Path(PathBuf::from(DEFAULT_CATALOG)),
            storage_dir: PathBuf::from(".shop-widget"),
            cart_key: DEFAULT_CART_KEY.to_string(),
            close_fallback: Duration::from_millis(DEFAULT_CLOSE_FALLBACK_MS),
            static_dir: PathBuf::from("crates/storefront/static"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl WidgetConfig {
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

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let catalog = CatalogLocation::parse(&get_or("SHOP_CATALOG", DEFAULT_CATALOG))
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_CATALOG".to_string(), e.to_string()))?;
        let close_fallback_ms = get_or(
            "SHOP_MODAL_CLOSE_FALLBACK_MS",
            &DEFAULT_CLOSE_FALLBACK_MS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOP_MODAL_CLOSE_FALLBACK_MS".to_string(), e.to_string())
        })?;
        let host = get_or("SHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_HOST".to_string(), e.to_string()))?;
        let port = get_or("SHOP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_PORT".to_string(), e.to_string()))?;

        let cart_key = get_or("SHOP_CART_KEY", DEFAULT_CART_KEY);
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            storage_dir: PathBuf::from(get_or("SHOP_STORAGE_DIR", ".shop-widget")),
            cart_key,
            close_fallback: Duration::from_millis(close_fallback_ms),
            static_dir: PathBuf::from(get_or("SHOP_STATIC_DIR", "crates/storefront/static")),
            host,
            port,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the static server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
