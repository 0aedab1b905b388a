//! Shared fixtures for unit tests.

use shop_widget_core::{Price, Product, ProductId};

#[allow(clippy::unwrap_used)]
pub fn product(id: i64, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::new(price.parse().unwrap()).unwrap(),
        image: format!("img/{id}.jpg"),
    }
}

/// Three products priced 1000, 2.5 and 2.5.
pub fn sample_catalog() -> Vec<Product> {
    vec![
        product(1, "Espresso Machine", "1000"),
        product(2, "Coffee Beans", "2.5"),
        product(3, "Paper Filters", "2.5"),
    ]
}
