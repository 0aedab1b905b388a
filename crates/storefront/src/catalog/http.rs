//! HTTP catalog loader.

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use shop_widget_core::Product;
use tracing::{debug, error, instrument};
use url::Url;

use super::{CatalogSource, LoadError, parse_catalog};

/// Fetches the catalog with `reqwest`, bypassing every HTTP cache.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    url: Url,
}

impl HttpCatalog {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Use an existing client (shared connection pool, custom timeouts).
    #[must_use]
    pub const fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl CatalogSource for HttpCatalog {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Vec<Product>, LoadError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "catalog request returned non-success status");
            return Err(LoadError::Status(status));
        }

        let body = response.bytes().await?;
        let products = parse_catalog(&body)?;
        debug!(count = products.len(), "catalog fetched");
        Ok(products)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
