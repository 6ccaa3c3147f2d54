//! Application state shared across handlers.

use std::sync::Arc;

use rocketshoes_core::CurrencyCode;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and is the only way handlers
/// reach the product service and the cart store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `api` - Product service client
    /// * `cart` - The cart store, loaded once at startup
    #[must_use]
    pub fn new(config: StorefrontConfig, api: ApiClient, cart: CartStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, api, cart }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product service client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Currency used for price display.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.config().currency
    }
}
