//! Catalog product record.

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// A single purchasable product as delivered by the catalog resource.
///
/// The JSON shape is `{"id": 1, "name": "...", "price": 9.5, "image": "..."}`.
/// Products are immutable once loaded; cart entries keep a snapshot that is
/// refreshed when the catalog is reloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, stable catalog identifier.
    pub id: ProductId,
    /// Display name (untrusted text, escape before rendering).
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
}

impl Product {
    /// Whether the product name contains `needle`, ignoring case.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}
