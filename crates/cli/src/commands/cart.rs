//! Cart commands.
//!
//! Failures are reported with the same localized notice the storefront
//! shows, followed by the underlying cause.

use rocketshoes_core::{Cart, Price, ProductId};
use rocketshoes_storefront::cart::{CartOperation, CartStoreError, Notice, UpdateProductAmount};
use thiserror::Error;

use super::Context;

/// A cart operation that did not go through.
#[derive(Debug, Error)]
#[error("{notice} ({source})")]
pub struct CartCommandError {
    pub notice: Notice,
    #[source]
    pub source: CartStoreError,
}

impl CartCommandError {
    fn new(operation: CartOperation, source: CartStoreError) -> Self {
        Self {
            notice: Notice::for_failure(operation, &source),
            source,
        }
    }
}

/// Log the cart entries and total.
pub async fn show(ctx: &Context) {
    log_cart(&ctx.cart.cart().await, ctx);
}

/// Add one unit of `id`.
///
/// # Errors
///
/// Returns the notice for the failure if the store rejects the operation.
pub async fn add(ctx: &Context, id: ProductId) -> Result<(), CartCommandError> {
    let cart = ctx
        .cart
        .add_product(id)
        .await
        .map_err(|e| CartCommandError::new(CartOperation::Add, e))?;

    tracing::info!("Produto #{id} adicionado ({} no carrinho)", cart.quantity_of(id));
    log_cart(&cart, ctx);
    Ok(())
}

/// Remove the entry for `id`.
///
/// # Errors
///
/// Returns the notice for the failure if the store rejects the operation.
pub async fn remove(ctx: &Context, id: ProductId) -> Result<(), CartCommandError> {
    let cart = ctx
        .cart
        .remove_product(id)
        .await
        .map_err(|e| CartCommandError::new(CartOperation::Remove, e))?;

    tracing::info!("Produto #{id} removido");
    log_cart(&cart, ctx);
    Ok(())
}

/// Set the amount of `id`.
///
/// # Errors
///
/// Returns the notice for the failure if the store rejects the operation.
pub async fn update(ctx: &Context, id: ProductId, amount: i64) -> Result<(), CartCommandError> {
    let cart = ctx
        .cart
        .update_product_amount(UpdateProductAmount {
            product_id: id,
            amount,
        })
        .await
        .map_err(|e| CartCommandError::new(CartOperation::UpdateAmount, e))?;

    log_cart(&cart, ctx);
    Ok(())
}

fn log_cart(cart: &Cart, ctx: &Context) {
    if cart.is_empty() {
        tracing::info!("Seu carrinho está vazio");
        return;
    }

    for item in cart {
        tracing::info!(
            "#{} {} - {} x {} = {}",
            item.id,
            item.title,
            item.amount,
            Price::new(item.price, ctx.currency).display(),
            Price::new(item.subtotal(), ctx.currency).display()
        );
    }

    tracing::info!("TOTAL: {}", Price::new(cart.total(), ctx.currency).display());
}
