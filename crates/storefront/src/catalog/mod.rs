//! Catalog loading.
//!
//! The catalog is a static JSON array of products. It is fetched once per
//! [`CatalogSource::load`] call, with no retry and no caching:
//!
//! - [`HttpCatalog`] - GET over `reqwest` with cache-bypass headers
//! - [`FileCatalog`] - read from the local filesystem
//! - [`AnyCatalog`] - picks one of the above from a [`CatalogLocation`]
//!
//! Payload handling is shared by [`parse_catalog`]: a payload that is not an
//! array is an empty catalog, and array entries that are not valid products
//! are skipped.

mod file;
mod http;

use std::future::Future;
use std::path::PathBuf;

use shop_widget_core::{Product, ProductId};
use thiserror::Error;
use tracing::warn;

use crate::config::CatalogLocation;

pub use file::FileCatalog;
pub use http::HttpCatalog;

/// Errors that can occur when fetching the catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport-level failure (DNS, connection refused, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Failed to load products: HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The catalog file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload is not JSON at all.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A source the catalog can be loaded from.
pub trait CatalogSource {
    /// Fetch the product list. Single attempt, no retry.
    fn load(&self) -> impl Future<Output = Result<Vec<Product>, LoadError>> + Send;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Either loader, chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum AnyCatalog {
    Http(HttpCatalog),
    File(FileCatalog),
}

impl AnyCatalog {
    #[must_use]
    pub fn from_location(location: &CatalogLocation) -> Self {
        match location {
            CatalogLocation::Url(url) => Self::Http(HttpCatalog::new(url.clone())),
            CatalogLocation::Path(path) => Self::File(FileCatalog::new(path.clone())),
        }
    }
}

impl CatalogSource for AnyCatalog {
    async fn load(&self) -> Result<Vec<Product>, LoadError> {
        match self {
            Self::Http(source) => source.load().await,
            Self::File(source) => source.load().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Http(source) => source.describe(),
            Self::File(source) => source.describe(),
        }
    }
}

/// Decode a catalog payload.
///
/// # Errors
///
/// Returns `serde_json::Error` only if `bytes` is not valid JSON. Valid JSON
/// of the wrong shape yields an empty (or partial) catalog instead.
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<Product>, serde_json::Error> {
    let payload: serde_json::Value = serde_json::from_slice(bytes)?;

    let serde_json::Value::Array(items) = payload else {
        warn!("catalog payload is not an array, treating as empty");
        return Ok(Vec::new());
    };

    let products = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Product>(item) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed catalog entry");
                None
            }
        })
        .collect();

    Ok(products)
}

/// First catalog record with `id`.
#[must_use]
pub fn find(catalog: &[Product], id: ProductId) -> Option<&Product> {
    catalog.iter().find(|p| p.id == id)
}
