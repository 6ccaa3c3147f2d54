//! Catalog listing.

use rocketshoes_storefront::api::ApiError;

use super::Context;

/// Log every product with its price and the units held in the cart.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn list(ctx: &Context) -> Result<(), ApiError> {
    let products = ctx.api.get_products().await?;
    let cart = ctx.cart.cart().await;

    for product in &products {
        tracing::info!(
            "#{} {} - {} (no carrinho: {})",
            product.id,
            product.title,
            product.price_in(ctx.currency).display(),
            cart.quantity_of(product.id)
        );
    }

    tracing::info!("{} products", products.len());
    Ok(())
}
