//! Shopping cart and its persistent store.
//!
//! [`Cart`] is the pure mapping from product id to [`CartEntry`]. It never
//! stores an entry with a quantity of zero: any change that would bring a
//! quantity to zero or below removes the entry instead.
//!
//! [`CartStore`] owns a cart together with a [`KeyValueStore`] and writes the
//! whole mapping back after every mutation. Storage failures are logged and
//! swallowed; the in-memory cart stays authoritative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shop_widget_core::{Price, Product, ProductId};
use tracing::{debug, warn};

use crate::catalog;
use crate::storage::KeyValueStore;

/// A product snapshot together with the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product: Product,
    pub qty: u32,
}

impl CartEntry {
    /// Price of this line (`price × qty`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.qty)
    }
}

/// Mapping from product id to cart entry, iterated in ascending id order.
///
/// Serializes as `{"<id>": {"product": {...}, "qty": n}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: BTreeMap<ProductId, CartEntry>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) {
        self.entries
            .entry(product.id)
            .and_modify(|entry| entry.qty = entry.qty.saturating_add(1))
            .or_insert_with(|| CartEntry {
                product: product.clone(),
                qty: 1,
            });
    }

    /// Adjust the quantity of `id` by `delta`, removing the entry if the
    /// result is zero or less. Quantities above `u32::MAX` are clamped to it.
    /// Returns `false` if `id` is not in the cart.
    pub fn change_qty(&mut self, id: ProductId, delta: i64) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };

        let next = i64::from(entry.qty).saturating_add(delta);
        if next <= 0 {
            self.entries.remove(&id);
        } else {
            entry.qty = u32::try_from(next).unwrap_or_else(|_| {
                warn!(product_id = %id, requested = next, "quantity clamped to maximum");
                u32::MAX
            });
        }
        true
    }

    /// Remove `id`. Returns whether an entry was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Remove every entry. Returns whether the cart was non-empty.
    pub fn clear(&mut self) -> bool {
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        had_entries
    }

    /// Refresh snapshots from `catalog` and drop entries whose id is gone.
    ///
    /// Returns whether anything changed.
    pub fn reconcile(&mut self, catalog: &[Product]) -> bool {
        let mut changed = false;
        self.entries.retain(|id, entry| {
            match catalog::find(catalog, *id) {
                Some(live) => {
                    if entry.product != *live {
                        entry.product = live.clone();
                        changed = true;
                    }
                    true
                }
                None => {
                    debug!(product_id = %id, "dropping cart entry for product no longer in catalog");
                    changed = true;
                    false
                }
            }
        });
        changed
    }

    /// Sum of `price × qty` over all entries.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.values().map(CartEntry::line_total).sum()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries.values().map(|e| u64::from(e.qty)).sum()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.get(&id)
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn drop_empty_entries(&mut self) {
        self.entries.retain(|_, entry| entry.qty > 0);
    }
}

/// A cart bound to a persistence key.
#[derive(Debug)]
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn KeyValueStore>,
    key: String,
}

impl CartStore {
    /// Create an empty store. Call [`CartStore::load`] to restore persisted
    /// state.
    #[must_use]
    pub fn new(storage: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            cart: Cart::new(),
            storage,
            key: key.into(),
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing store.
    #[must_use]
    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Restore the cart from storage.
    ///
    /// Missing data leaves an empty cart; unreadable or corrupt data resets to
    /// an empty cart with a warning.
    pub fn load(&mut self) {
        self.cart = match self.storage.get_item(&self.key) {
            Ok(None) => Cart::new(),
            Ok(Some(raw)) => match serde_json::from_str::<Option<Cart>>(&raw) {
                Ok(cart) => {
                    let mut cart = cart.unwrap_or_default();
                    cart.drop_empty_entries();
                    cart
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Failed to load cart, starting empty");
                    Cart::new()
                }
            },
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load cart, starting empty");
                Cart::new()
            }
        };
        debug!(entries = self.cart.len(), "cart loaded");
    }

    /// Persist the full cart. Returns whether the write succeeded.
    pub fn save(&mut self) -> bool {
        let result = serde_json::to_string(&self.cart)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .set_item(&self.key, &json)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to save cart");
                false
            }
        }
    }

    /// Add one unit of the catalog product `id`. No-op if `id` is not in
    /// `catalog`; the first matching record wins.
    pub fn add_to_cart(&mut self, id: ProductId, catalog: &[Product]) -> bool {
        let Some(product) = catalog::find(catalog, id) else {
            debug!(product_id = %id, "add to cart ignored, unknown product");
            return false;
        };
        self.cart.add(product);
        self.save();
        true
    }

    /// Adjust the quantity of `id` by `delta`. No-op if `id` is not in the cart.
    pub fn change_qty(&mut self, id: ProductId, delta: i64) -> bool {
        if !self.cart.change_qty(id, delta) {
            return false;
        }
        self.save();
        true
    }

    /// Remove `id`. No-op if absent.
    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        if !self.cart.remove(id) {
            return false;
        }
        self.save();
        true
    }

    /// Empty the cart and persist the empty mapping.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.save();
    }

    /// Re-sync against a freshly loaded catalog; persists when changed.
    pub fn reconcile(&mut self, catalog: &[Product]) -> bool {
        let changed = self.cart.reconcile(catalog);
        if changed {
            self.save();
        }
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use crate::testing::{product, sample_catalog as catalog};

    /// Store that refuses every write.
    #[derive(Debug, Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn store_with(raw: Option<&str>) -> CartStore {
        let mut storage = MemoryStore::new();
        if let Some(raw) = raw {
            storage.set_item("cart_v1", raw).unwrap();
        }
        CartStore::new(Box::new(storage), "cart_v1")
    }

    #[test]
    fn test_add_twice_yields_qty_two() {
        let mut store = store_with(None);
        assert!(store.add_to_cart(ProductId::new(2), &catalog()));
        assert!(store.add_to_cart(ProductId::new(2), &catalog()));
        assert_eq!(store.cart().get(ProductId::new(2)).unwrap().qty, 2);
        assert_eq!(store.cart().len(), 1);
    }

    #[test]
    fn test_add_unknown_id_leaves_cart_unchanged() {
        let mut store = store_with(None);
        store.add_to_cart(ProductId::new(1), &catalog());
        let before = store.cart().clone();

        assert!(!store.add_to_cart(ProductId::new(99), &catalog()));
        assert_eq!(store.cart(), &before);
    }

    #[test]
    fn test_change_qty_to_zero_removes_entry() {
        let mut store = store_with(None);
        for _ in 0..3 {
            store.add_to_cart(ProductId::new(1), &catalog());
        }

        assert!(store.change_qty(ProductId::new(1), -3));
        assert!(store.cart().get(ProductId::new(1)).is_none());
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_change_qty_below_zero_removes_entry() {
        let mut cart = Cart::new();
        cart.add(&catalog()[0]);
        assert!(cart.change_qty(ProductId::new(1), -10));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_qty_absent_is_noop() {
        let mut store = store_with(None);
        assert!(!store.change_qty(ProductId::new(1), 1));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = store_with(None);
        store.add_to_cart(ProductId::new(1), &catalog());
        assert!(!store.remove_from_cart(ProductId::new(2)));
        assert!(store.remove_from_cart(ProductId::new(1)));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_total_and_count() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog[0]);
        cart.add(&catalog[1]);
        cart.add(&catalog[1]);
        cart.add(&catalog[2]);
        cart.add(&catalog[2]);

        assert_eq!(cart.total().to_string(), "1,010.00 €");
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_total_saturates_on_huge_line() {
        let gold = product(1, "Gold Bar", "100000000000000000000");
        let mut cart = Cart::new();
        cart.add(&gold);
        cart.change_qty(gold.id, 4_000_000_000);

        assert_eq!(cart.total(), Price::MAX);
    }

    #[test]
    fn test_change_qty_clamps_to_max() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog[0]);

        assert!(cart.change_qty(catalog[0].id, i64::MAX));
        assert_eq!(cart.get(catalog[0].id).map(|e| e.qty), Some(u32::MAX));
        assert_eq!(cart.item_count(), u64::from(u32::MAX));

        assert!(cart.change_qty(catalog[0].id, -1));
        assert_eq!(cart.get(catalog[0].id).map(|e| e.qty), Some(u32::MAX - 1));
    }

    #[test]
    fn test_save_then_load_reproduces_cart() {
        let mut store = store_with(None);
        store.add_to_cart(ProductId::new(1), &catalog());
        store.add_to_cart(ProductId::new(3), &catalog());
        store.add_to_cart(ProductId::new(3), &catalog());
        let saved = store.cart().clone();

        let raw = store.storage.get_item("cart_v1").unwrap().unwrap();
        let mut reloaded = store_with(Some(&raw));
        reloaded.load();
        reloaded.reconcile(&catalog());

        assert_eq!(reloaded.cart(), &saved);
    }

    #[test]
    fn test_persisted_shape_is_keyed_by_id() {
        let mut store = store_with(None);
        store.add_to_cart(ProductId::new(2), &catalog());

        let raw = store.storage.get_item("cart_v1").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["2"]["qty"], 1);
        assert_eq!(value["2"]["product"]["name"], "Coffee Beans");
    }

    #[test]
    fn test_reconcile_drops_dangling_and_refreshes_snapshots() {
        let mut store = store_with(None);
        store.add_to_cart(ProductId::new(1), &catalog());
        store.add_to_cart(ProductId::new(2), &catalog());

        let fresh = vec![product(2, "Coffee Beans (1kg)", "12")];
        assert!(store.reconcile(&fresh));

        assert!(store.cart().get(ProductId::new(1)).is_none());
        let entry = store.cart().get(ProductId::new(2)).unwrap();
        assert_eq!(entry.product.name, "Coffee Beans (1kg)");
        assert_eq!(entry.qty, 1);

        assert!(!store.reconcile(&fresh));
    }

    #[test]
    fn test_load_corrupt_data_resets_to_empty() {
        for raw in ["not json", r#"{"1": {"qty": 2}}"#, "[1,2,3]", r#"{"1":{"product":{},"qty":-1}}"#] {
            let mut store = store_with(Some(raw));
            store.load();
            assert!(store.cart().is_empty(), "{raw} should reset the cart");
        }
    }

    #[test]
    fn test_load_null_is_empty() {
        let mut store = store_with(Some("null"));
        store.load();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_load_drops_zero_quantity_entries() {
        let raw = serde_json::json!({
            "1": {"product": {"id": 1, "name": "A", "price": 1, "image": ""}, "qty": 0},
            "2": {"product": {"id": 2, "name": "B", "price": 2, "image": ""}, "qty": 4},
        })
        .to_string();

        let mut store = store_with(Some(&raw));
        store.load();
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().get(ProductId::new(2)).unwrap().qty, 4);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let mut store = CartStore::new(Box::new(ReadOnlyStore::default()), "cart_v1");
        assert!(store.add_to_cart(ProductId::new(1), &catalog()));
        assert_eq!(store.cart().item_count(), 1);
        assert!(!store.save());
    }
}
