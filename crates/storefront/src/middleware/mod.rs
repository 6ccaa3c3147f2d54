//! HTTP middleware for the storefront.
//!
//! Layered in [`crate::routes::app`], outermost first: `TraceLayer` opens
//! the request span, then [`request_id_middleware`] fills in its
//! `request_id` field.

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
