//! Filesystem catalog loader.

use std::path::PathBuf;

use shop_widget_core::Product;
use tracing::{debug, instrument};

use super::{CatalogSource, LoadError, parse_catalog};

/// Reads the catalog from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalog {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<Product>, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;

        let products = parse_catalog(&bytes)?;
        debug!(count = products.len(), "catalog read");
        Ok(products)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
