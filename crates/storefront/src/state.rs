//! Application state owned by the widget.
//!
//! `AppState` is the single owning context: catalog, cart store, document,
//! cart modal and dialogs all live here and are mutated only through
//! [`AppState::dispatch`](crate::commands) and [`AppState::boot`].

use std::time::Duration;

use shop_widget_core::Product;
use tracing::{info, instrument};

use crate::cart::{Cart, CartStore};
use crate::catalog::CatalogSource;
use crate::config::WidgetConfig;
use crate::dialogs::Dialogs;
use crate::dom::{Document, Mount};
use crate::error::report;
use crate::modal::Modal;
use crate::render;
use crate::search;
use crate::storage::KeyValueStore;

/// Outcome of the startup catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    /// `boot` has not run yet.
    Pending,
    /// Catalog loaded with this many products.
    Loaded(usize),
    /// Catalog failed to load; the message is what the grid shows.
    Failed(String),
}

/// Application state for one widget instance.
#[derive(Debug)]
pub struct AppState {
    pub(crate) catalog: Vec<Product>,
    pub(crate) catalog_status: CatalogStatus,
    pub(crate) cart: CartStore,
    pub(crate) document: Document,
    pub(crate) cart_modal: Modal,
    pub(crate) dialogs: Box<dyn Dialogs>,
    pub(crate) close_fallback: Duration,
}

impl AppState {
    /// Create a new application state with an empty catalog.
    ///
    /// # Arguments
    ///
    /// * `storage` - Backend for the persisted cart
    /// * `document` - Page surface to render into
    /// * `dialogs` - Confirm/alert implementation
    /// * `config` - Cart key and modal timing
    #[must_use]
    pub fn new(
        storage: Box<dyn KeyValueStore>,
        document: Document,
        dialogs: Box<dyn Dialogs>,
        config: &WidgetConfig,
    ) -> Self {
        Self {
            catalog: Vec::new(),
            catalog_status: CatalogStatus::Pending,
            cart: CartStore::new(storage, config.cart_key.clone()),
            document,
            cart_modal: Modal::new(Mount::CartModal),
            dialogs,
            close_fallback: config.close_fallback,
        }
    }

    /// Startup sequence: restore the cart, fetch the catalog, render the grid
    /// (or the inline error), reconcile the cart against the fresh catalog
    /// and render the cart panel.
    ///
    /// Never fails: a catalog error leaves an empty catalog and keeps the
    /// restored cart snapshots as they are.
    #[instrument(skip_all, fields(source = %source.describe()))]
    pub async fn boot<C: CatalogSource>(&mut self, source: &C) {
        self.cart.load();

        match source.load().await {
            Ok(products) => {
                info!(count = products.len(), "catalog loaded");
                self.catalog_status = CatalogStatus::Loaded(products.len());
                self.catalog = products;
                self.render_products();
                self.cart.reconcile(&self.catalog);
            }
            Err(e) => {
                report(&e, "Failed to load catalog");
                let message = e.to_string();
                if let Err(render_err) = render::render_load_error(&mut self.document, &message) {
                    report(&render_err, "Failed to render catalog error");
                }
                self.catalog.clear();
                self.catalog_status = CatalogStatus::Failed(message);
            }
        }

        self.render_cart();
    }

    /// Re-render the grid for the current search input.
    pub(crate) fn render_products(&mut self) {
        let query = self.document.value(Mount::SearchInput).to_string();
        let results = search::filter(&self.catalog, &query);
        if let Err(e) = render::render_products(&mut self.document, results) {
            report(&e, "Failed to render products");
        }
    }

    pub(crate) fn render_cart(&mut self) {
        if let Err(e) = render::render_cart(&mut self.document, self.cart.cart()) {
            report(&e, "Failed to render cart");
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    #[must_use]
    pub const fn catalog_status(&self) -> &CatalogStatus {
        &self.catalog_status
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable page access, for wiring that happens outside commands (e.g.
    /// setting initial focus).
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[must_use]
    pub const fn cart_modal(&self) -> &Modal {
        &self.cart_modal
    }
}
