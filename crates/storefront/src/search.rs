//! Catalog search.
//!
//! Plain case-insensitive substring matching over product names. No
//! tokenizing, no ranking: results keep catalog order.

use shop_widget_core::Product;

/// Normalize raw input text into a search needle (trimmed, lowercased).
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Products whose name contains `query`, ignoring case.
///
/// An empty (or whitespace-only) query returns the whole catalog.
#[must_use]
pub fn filter<'a>(catalog: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return catalog.iter().collect();
    }
    catalog.iter().filter(|p| p.name_contains(&needle)).collect()
}
