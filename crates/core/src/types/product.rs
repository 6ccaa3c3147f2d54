//! Catalog products, stock levels and cart-resident items.
//!
//! The remote catalog serves [`Product`] and [`Stock`] documents; a product
//! that has been added to the cart becomes a [`CartItem`], which carries the
//! same fields plus the quantity held in the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// A product as served by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price, a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

impl Product {
    /// Unit price in the given currency.
    #[must_use]
    pub const fn price_in(&self, currency_code: CurrencyCode) -> Price {
        Price::new(self.price, currency_code)
    }
}

/// Remote-authoritative stock level for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    /// Maximum purchasable quantity. Zero or negative means nothing can be bought.
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units fit within this stock level.
    #[must_use]
    pub fn allows(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}

/// One product's entry in the cart.
///
/// Serialized flat, as `{ id, title, price, image, amount }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    /// Quantity held in the cart. Always at least 1 inside a [`Cart`](super::Cart).
    pub amount: u32,
}

impl CartItem {
    /// Create a cart entry for `product` holding `amount` units.
    #[must_use]
    pub fn new(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Unit price times amount, or `None` if the product does not fit a `Decimal`.
    #[must_use]
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.amount))
    }

    /// Unit price times amount, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.amount))
    }
}
