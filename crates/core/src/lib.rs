//! RocketShoes Core - Shared domain types.
//!
//! This crate provides the types shared by every RocketShoes component:
//! - `storefront` - Server-rendered storefront and the cart store
//! - `cli` - Command-line access to the catalog and the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart transitions - no I/O,
//! no storage access, no HTTP clients. Every cart mutation is expressed as a
//! function from one `Cart` value to the next, so callers can validate and
//! persist the new value before committing it.
//!
//! # Modules
//!
//! - [`types`] - Product ids, products, stock, prices and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
