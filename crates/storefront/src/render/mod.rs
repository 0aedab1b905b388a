//! Projection of widget state into the document.
//!
//! Every renderer produces an askama fragment and writes it into a mount
//! point. Askama escapes all interpolated text, so product names and image
//! URLs from the catalog can never inject markup.

mod cart;
mod products;

pub use cart::{CartItemView, CartItemsTemplate, render_cart};
pub use products::{
    LoadErrorTemplate, ProductCardView, ProductGridTemplate, render_load_error, render_products,
};

use askama::Template;
use thiserror::Error;

use crate::dom::{Document, Mount};

/// Template rendering failed.
#[derive(Debug, Error)]
#[error("Template error: {0}")]
pub struct RenderError(#[from] askama::Error);

/// Render `template` and write it into `mount`.
///
/// On failure the mount keeps its previous content.
fn render_into<T: Template>(
    doc: &mut Document,
    mount: Mount,
    template: &T,
) -> Result<(), RenderError> {
    let html = template.render()?;
    doc.set_inner_html(mount, html);
    Ok(())
}
