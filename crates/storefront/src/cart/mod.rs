//! The cart store: the single owner of the user's cart.
//!
//! # Operations
//!
//! - [`CartStore::add_product`] - add one unit, appending a new entry if needed
//! - [`CartStore::remove_product`] - drop an entry
//! - [`CartStore::update_product_amount`] - set an entry's amount
//!
//! Additions and amount updates are validated against the stock reported by
//! the product service at the time of the call.
//!
//! # Consistency
//!
//! Each operation computes the next [`Cart`] value, writes it to durable
//! storage under [`CART_STORAGE_KEY`], and only then makes it current. Any
//! failure along the way leaves both the in-memory cart and storage as they
//! were. Operations hold the store's lock from start to finish, remote
//! fetches included, so they never interleave.

mod notice;

pub use notice::{CartOperation, Notice};

use std::sync::Arc;

use rocketshoes_core::{Cart, CartError, CartItem, ProductId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::storage::{CART_STORAGE_KEY, Storage, StorageError};

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The requested quantity is greater than the available stock.
    #[error("requested {requested} units of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The cart rejected the transition (e.g. the product is not in the cart).
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The product service could not be reached or answered badly.
    #[error("Product service error: {0}")]
    Api(#[from] ApiError),

    /// The new cart could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The new cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Arguments of [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Desired absolute quantity. Values of 0 or less are ignored.
    pub amount: i64,
}

/// Shared handle to the cart.
///
/// Cheaply cloneable via `Arc`; every clone sees and mutates the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    cart: Mutex<Cart>,
}

impl CartStore {
    /// Create a store whose initial cart is read from `storage`.
    ///
    /// A missing, unreadable or invalid stored value yields an empty cart.
    pub fn load(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let cart = read_stored_cart(storage.as_ref());
        tracing::info!(entries = cart.len(), "Cart loaded");

        Self {
            inner: Arc::new(CartStoreInner {
                api,
                storage,
                cart: Mutex::new(cart),
            }),
        }
    }

    /// Snapshot of the current cart.
    pub async fn cart(&self) -> Cart {
        self.inner.cart.lock().await.clone()
    }

    /// Add one unit of `product_id`.
    ///
    /// Appends a new entry with amount 1 when the product is not yet in the
    /// cart; otherwise increments the existing entry.
    ///
    /// # Errors
    ///
    /// Returns `StockExceeded` if the new amount would exceed the stock, or a
    /// transient error if the product service or storage fails. The cart is
    /// unchanged on error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart, CartStoreError> {
        let mut cart = self.inner.cart.lock().await;

        let stock = self.inner.api.get_stock(product_id).await?;
        let requested = cart.quantity_of(product_id).saturating_add(1);

        if !stock.allows(i64::from(requested)) {
            return Err(CartStoreError::StockExceeded {
                product_id,
                requested: i64::from(requested),
                available: stock.amount,
            });
        }

        let next = if cart.contains(product_id) {
            cart.with_amount(product_id, requested)?
        } else {
            let product = self.inner.api.get_product(product_id).await?;
            cart.with_appended(CartItem::new(product, 1))?
        };

        self.commit(&mut cart, next).await?;
        tracing::info!(amount = requested, "Product added to cart");
        Ok(cart.clone())
    }

    /// Remove the entry for `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `Cart(NotInCart)` if the product has no entry, or a storage
    /// error if the new cart cannot be persisted. The cart is unchanged on error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart, CartStoreError> {
        let mut cart = self.inner.cart.lock().await;

        let next = cart.without(product_id)?;

        self.commit(&mut cart, next).await?;
        tracing::info!("Product removed from cart");
        Ok(cart.clone())
    }

    /// Set the amount held for a product.
    ///
    /// Amounts of 0 or less are ignored and return the current cart.
    ///
    /// # Errors
    ///
    /// Returns `StockExceeded` if `amount` exceeds the stock, `Cart(NotInCart)`
    /// if the product has no entry, or a transient error if the product
    /// service or storage fails. The cart is unchanged on error.
    #[instrument(skip(self, update), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<Cart, CartStoreError> {
        let UpdateProductAmount { product_id, amount } = update;
        let mut cart = self.inner.cart.lock().await;

        if amount <= 0 {
            tracing::debug!("Ignoring non-positive amount");
            return Ok(cart.clone());
        }

        let stock = self.inner.api.get_stock(product_id).await?;

        let exceeded = CartStoreError::StockExceeded {
            product_id,
            requested: amount,
            available: stock.amount,
        };
        if !stock.allows(amount) {
            return Err(exceeded);
        }
        // Cart entries hold at most u32::MAX units
        let requested = u32::try_from(amount).map_err(|_| exceeded)?;

        let next = cart.with_amount(product_id, requested)?;

        self.commit(&mut cart, next).await?;
        tracing::info!("Cart amount updated");
        Ok(cart.clone())
    }

    /// Persist `next`, then make it the current cart.
    ///
    /// The write runs on the blocking pool; the caller keeps the lock until
    /// it has finished.
    async fn commit(&self, current: &mut Cart, next: Cart) -> Result<(), CartStoreError> {
        let json = serde_json::to_string(&next)?;
        let storage = Arc::clone(&self.inner.storage);

        tokio::task::spawn_blocking(move || storage.set_item(CART_STORAGE_KEY, &json))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage write task failed: {e}")))??;

        *current = next;
        Ok(())
    }
}

/// Read the stored cart, falling back to an empty one.
fn read_stored_cart(storage: &dyn Storage) -> Cart {
    let stored = match storage.get_item(CART_STORAGE_KEY) {
        Ok(Some(stored)) => stored,
        Ok(None) => return Cart::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&stored).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored cart is invalid, starting empty");
        Cart::new()
    })
}
