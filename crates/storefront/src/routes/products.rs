//! Product listing handler.
//!
//! Renders the catalog with each product's formatted price and the quantity
//! of it currently held in the cart. Holds no state of its own.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use rocketshoes_core::{CurrencyCode, Product, ProductId};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    /// Formatted unit price, e.g. "R$ 179,90".
    pub price: String,
    /// Units of this product in the cart (0 if absent).
    pub quantity: u32,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            image: product.image.clone(),
            price: product.price_in(currency).display(),
            quantity,
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub cart_count: usize,
}

/// Display the product listing page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<ProductsIndexTemplate> {
    let catalog = state.api().get_products().await?;
    let cart = state.cart().cart().await;

    let products = catalog
        .iter()
        .map(|product| ProductView::new(product, state.currency(), cart.quantity_of(product.id)))
        .collect();

    Ok(ProductsIndexTemplate {
        products,
        cart_count: cart.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_view_formats_price() {
        let product = Product {
            id: ProductId::new(1),
            title: "Tênis de Caminhada Leve Confortável".to_string(),
            price: "179.9".parse().unwrap(),
            image: "tenis1.jpg".to_string(),
        };

        let view = ProductView::new(&product, CurrencyCode::BRL, 2);
        assert_eq!(view.price, "R$ 179,90");
        assert_eq!(view.quantity, 2);
        assert_eq!(view.id, ProductId::new(1));
    }

    #[test]
    fn test_index_template_renders_quantities() {
        let template = ProductsIndexTemplate {
            products: vec![ProductView {
                id: ProductId::new(7),
                title: "Tênis Adidas".to_string(),
                image: "tenis7.jpg".to_string(),
                price: "R$ 99,90".to_string(),
                quantity: 3,
            }],
            cart_count: 1,
        };

        let html = template.render().unwrap();
        assert!(html.contains("Tênis Adidas"));
        assert!(html.contains("R$ 99,90"));
        assert!(html.contains(r#"id="quantity-7""#));
        assert!(html.contains(">3<"));
    }
}
