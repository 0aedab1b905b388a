//! Product grid rendering.

use askama::Template;
use shop_widget_core::Product;

use super::{RenderError, render_into};
use crate::dom::{Document, Mount};

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
        }
    }
}

/// Product grid fragment.
#[derive(Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub cards: Vec<ProductCardView>,
}

/// Inline error shown in place of the grid.
#[derive(Template)]
#[template(path = "partials/load_error.html")]
pub struct LoadErrorTemplate {
    pub message: String,
}

/// Replace the grid with one card per product, or the placeholder when
/// `products` is empty. Returns the number of cards rendered.
///
/// # Errors
///
/// Returns `RenderError` if the template fails; the grid is left untouched.
pub fn render_products<'a>(
    doc: &mut Document,
    products: impl IntoIterator<Item = &'a Product>,
) -> Result<usize, RenderError> {
    let cards: Vec<ProductCardView> = products.into_iter().map(ProductCardView::from).collect();
    let count = cards.len();
    render_into(doc, Mount::Products, &ProductGridTemplate { cards })?;
    Ok(count)
}

/// Replace the grid with an inline error message.
///
/// # Errors
///
/// Returns `RenderError` if the template fails.
pub fn render_load_error(doc: &mut Document, message: &str) -> Result<(), RenderError> {
    render_into(
        doc,
        Mount::Products,
        &LoadErrorTemplate {
            message: message.to_string(),
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{product, sample_catalog};

    fn grid(doc: &Document) -> &str {
        doc.inner_html(Mount::Products).unwrap()
    }

    #[test]
    fn test_one_card_per_product() {
        let mut doc = Document::standard();
        let catalog = sample_catalog();

        let count = render_products(&mut doc, &catalog).unwrap();
        assert_eq!(count, 3);

        let html = grid(&doc);
        assert_eq!(html.matches("<article class=\"card\"").count(), 3);
        for p in &catalog {
            assert!(html.contains(&format!("ID: {}", p.id)));
            assert!(html.contains(&format!("data-id=\"{}\"", p.id)));
            assert!(html.contains(&p.name));
        }
        assert!(html.contains("1,000.00 €"));
        assert!(!html.contains("No products found."));
    }

    #[test]
    fn test_empty_renders_placeholder() {
        let mut doc = Document::standard();
        let count = render_products(&mut doc, &[]).unwrap();

        assert_eq!(count, 0);
        assert!(grid(&doc).contains("No products found."));
        assert!(!grid(&doc).contains("<article"));
    }

    #[test]
    fn test_name_is_escaped() {
        let mut doc = Document::standard();
        let hostile = product(7, "<script>x</script>", "1");
        render_products(&mut doc, [&hostile]).unwrap();

        let html = grid(&doc);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    }

    #[test]
    fn test_image_attribute_cannot_break_out() {
        let mut doc = Document::standard();
        let mut hostile = product(8, "Mug", "1");
        hostile.image = "x\" onerror=\"alert(1)".to_string();
        render_products(&mut doc, [&hostile]).unwrap();

        assert!(!grid(&doc).contains("\" onerror=\""));
    }

    #[test]
    fn test_load_error_replaces_grid() {
        let mut doc = Document::standard();
        render_products(&mut doc, &sample_catalog()).unwrap();
        render_load_error(&mut doc, "Failed to load products: HTTP 404 Not Found").unwrap();

        let html = grid(&doc);
        assert!(html.contains("Error: Failed to load products: HTTP 404 Not Found"));
        assert!(!html.contains("<article"));
    }

    #[test]
    fn test_missing_grid_mount_is_noop() {
        let mut doc = Document::with_mounts(&[Mount::CartItems]);
        assert_eq!(render_products(&mut doc, &sample_catalog()).unwrap(), 3);
        assert!(doc.inner_html(Mount::Products).is_none());
    }
}
