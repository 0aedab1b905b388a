//! Cart panel rendering.

use askama::Template;

use super::{RenderError, render_into};
use crate::cart::{Cart, CartEntry};
use crate::dom::{Document, Mount};

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub qty: u32,
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.product.id.to_string(),
            name: entry.product.name.clone(),
            price: entry.product.price.to_string(),
            image: entry.product.image.clone(),
            qty: entry.qty,
        }
    }
}

/// Cart items fragment.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub items: Vec<CartItemView>,
}

/// Rebuild the cart line list, the total and the badge count, and register
/// the panel's focusable controls in tab order.
///
/// # Errors
///
/// Returns `RenderError` if the line list template fails. Total and count
/// are still updated in that case.
pub fn render_cart(doc: &mut Document, cart: &Cart) -> Result<(), RenderError> {
    let items: Vec<CartItemView> = cart.entries().map(CartItemView::from).collect();

    doc.set_text(Mount::TotalPrice, cart.total().to_string());
    doc.set_text(Mount::CartCount, cart.item_count().to_string());

    let focusable = focus_order(doc, &items);
    doc.set_focusable(Mount::CartModal, focusable);

    render_into(doc, Mount::CartItems, &CartItemsTemplate { items })
}

fn focus_order(doc: &Document, items: &[CartItemView]) -> Vec<String> {
    let mut ids = Vec::with_capacity(items.len() * 3 + 3);
    if doc.has(Mount::CloseCartBtn) {
        ids.push(Mount::CloseCartBtn.id().to_string());
    }
    for item in items {
        ids.push(format!("dec-{}", item.id));
        ids.push(format!("inc-{}", item.id));
        ids.push(format!("remove-{}", item.id));
    }
    for mount in [Mount::ClearCart, Mount::Checkout] {
        if doc.has(mount) {
            ids.push(mount.id().to_string());
        }
    }
    ids
}
