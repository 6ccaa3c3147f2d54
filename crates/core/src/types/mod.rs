//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartError};
pub use id::*;
pub use price::{CurrencyCode, ParseCurrencyError, Price};
pub use product::{CartItem, Product, Stock};
