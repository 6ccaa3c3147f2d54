//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Successful mutations send `HX-Trigger: cart-updated` so the header badge
//! refreshes itself; failures swap a toast into `#toast` instead of the
//! requested fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rocketshoes_core::{Cart, CartItem, CurrencyCode, Price, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::cart::{CartOperation, CartStoreError, Notice, UpdateProductAmount};
use crate::error::add_breadcrumb;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub price: String,
    pub amount: u32,
    pub subtotal: String,
    /// Amount after pressing "-" (0 is ignored by the store).
    pub decrement_to: u32,
    /// Amount after pressing "+".
    pub increment_to: u32,
}

impl CartItemView {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            image: item.image.clone(),
            price: Price::new(item.price, currency).display(),
            amount: item.amount,
            subtotal: Price::new(item.subtotal(), currency).display(),
            decrement_to: item.amount.saturating_sub(1),
            increment_to: item.amount.saturating_add(1),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    /// Number of distinct products.
    pub item_count: usize,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            total: Price::new(cart.total(), currency).display(),
            item_count: cart.len(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: usize,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

/// Product quantity badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_quantity.html")]
pub struct ProductQuantityTemplate {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Toast fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub message: &'static str,
}

/// Render a failed operation as a toast swapped into `#toast`.
fn failure(operation: CartOperation, error: &CartStoreError) -> Response {
    let notice = Notice::for_failure(operation, error);

    if matches!(error, CartStoreError::StockExceeded { .. }) {
        tracing::info!(?operation, %error, "Cart operation rejected");
    } else {
        tracing::warn!(?operation, %error, "Cart operation failed");
    }

    (
        AppendHeaders([("HX-Retarget", "#toast"), ("HX-Reswap", "innerHTML")]),
        ToastTemplate {
            message: notice.message(),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let cart = state.cart().cart().await;

    CartShowTemplate {
        cart: CartView::new(&cart, state.currency()),
        cart_count: cart.len(),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Returns the product's updated quantity badge.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Response {
    let product_id = form.product_id;

    match state.cart().add_product(product_id).await {
        Ok(cart) => {
            let id = product_id.to_string();
            add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));

            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                ProductQuantityTemplate {
                    product_id,
                    quantity: cart.quantity_of(product_id),
                },
            )
                .into_response()
        }
        Err(e) => failure(CartOperation::Add, &e),
    }
}

/// Set the quantity of a cart entry (HTMX).
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Response {
    let update = UpdateProductAmount {
        product_id: form.product_id,
        amount: form.amount,
    };

    match state.cart().update_product_amount(update).await {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::new(&cart, state.currency()),
            },
        )
            .into_response(),
        Err(e) => failure(CartOperation::UpdateAmount, &e),
    }
}

/// Remove a product from the cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    match state.cart().remove_product(form.product_id).await {
        Ok(cart) => {
            let id = form.product_id.to_string();
            add_breadcrumb("cart", "Removed product", Some(&[("product_id", id.as_str())]));

            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate {
                    cart: CartView::new(&cart, state.currency()),
                },
            )
                .into_response()
        }
        Err(e) => failure(CartOperation::Remove, &e),
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.cart().cart().await.len(),
    }
}
