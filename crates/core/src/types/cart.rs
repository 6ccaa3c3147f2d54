//! The shopping cart: an ordered collection of entries, unique by product id.
//!
//! `Cart` is a value. Every transition (`with_appended`, `with_amount`,
//! `without`) returns a new cart and leaves the receiver untouched, so a
//! caller can persist the next value before making it current. Stock limits
//! are enforced by the caller; the cart only guarantees its own shape:
//!
//! - at most one entry per product id, in insertion order
//! - every entry holds an amount of at least 1
//! - the total of all entries fits in a `Decimal`

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::product::CartItem;

/// Errors raised by cart transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product has no entry in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The product already has an entry in the cart.
    #[error("product {0} is already in the cart")]
    DuplicateEntry(ProductId),

    /// Entries must hold at least one unit.
    #[error("invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: u32 },

    /// The cart total would not fit in a `Decimal`.
    #[error("cart total overflows with product {0}")]
    TotalOverflow(ProductId),
}

/// The user's current selection of products with quantities.
///
/// Serializes as a plain JSON array of entries. Deserializing data with a
/// duplicate id, a zero amount or an unrepresentable total fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from entries, validating uniqueness and amounts.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if two entries share an id and
    /// `InvalidAmount` if an entry holds zero units.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartError> {
        let mut cart = Self::new();
        for item in items {
            cart = cart.with_appended(item)?;
        }
        Ok(cart)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The entry for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Amount held for `product_id`, or 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.get(product_id).map_or(0, |item| item.amount)
    }

    /// Amount held per product.
    #[must_use]
    pub fn quantities(&self) -> HashMap<ProductId, u32> {
        self.items
            .iter()
            .map(|item| (item.id, item.amount))
            .collect()
    }

    /// Sum of every entry's subtotal.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |total, item| total.saturating_add(item.subtotal()))
    }

    /// A cart with `item` appended at the end.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if the product is already present,
    /// `InvalidAmount` if the item holds zero units and `TotalOverflow` if
    /// the total would no longer fit.
    pub fn with_appended(&self, item: CartItem) -> Result<Self, CartError> {
        if item.amount == 0 {
            return Err(CartError::InvalidAmount {
                product_id: item.id,
                amount: item.amount,
            });
        }
        if self.contains(item.id) {
            return Err(CartError::DuplicateEntry(item.id));
        }

        let mut items = self.items.clone();
        items.push(item);
        Self::checked(items)
    }

    /// A cart where the entry for `product_id` holds exactly `amount` units.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the product is absent, `InvalidAmount` if
    /// `amount` is zero and `TotalOverflow` if the total would no longer fit.
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Result<Self, CartError> {
        if amount == 0 {
            return Err(CartError::InvalidAmount { product_id, amount });
        }

        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|item| item.id == product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        item.amount = amount;
        Self::checked(items)
    }

    /// A cart without the entry for `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the product is absent.
    pub fn without(&self, product_id: ProductId) -> Result<Self, CartError> {
        if !self.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.id != product_id)
            .cloned()
            .collect();
        Ok(Self { items })
    }

    /// Wrap `items`, rejecting them if their total is not representable.
    fn checked(items: Vec<CartItem>) -> Result<Self, CartError> {
        let mut total = Decimal::ZERO;
        for item in &items {
            total = item
                .checked_subtotal()
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(CartError::TotalOverflow(item.id))?;
        }
        Ok(Self { items })
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
