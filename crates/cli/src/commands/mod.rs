//! CLI command implementations.

pub mod cart;
pub mod products;

use std::sync::Arc;

use rocketshoes_core::CurrencyCode;
use rocketshoes_storefront::api::{ApiClient, ApiError};
use rocketshoes_storefront::cart::CartStore;
use rocketshoes_storefront::config::{ConfigError, StorefrontConfig};
use rocketshoes_storefront::storage::{FileStorage, StorageError};
use thiserror::Error;

/// Errors raised while preparing a command.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Product service client error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Collaborators shared by every command.
pub struct Context {
    pub api: ApiClient,
    pub cart: CartStore,
    pub currency: CurrencyCode,
}

impl Context {
    /// Build the product client and cart store from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the storage
    /// directory cannot be opened.
    pub fn from_env() -> Result<Self, SetupError> {
        let config = StorefrontConfig::from_env()?;
        let api = ApiClient::new(&config.api)?;
        let storage = FileStorage::open(&config.storage_dir)?;

        tracing::debug!(
            base_url = %api.base_url(),
            storage_dir = %storage.dir().display(),
            "CLI context ready"
        );

        Ok(Self {
            cart: CartStore::load(api.clone(), Arc::new(storage)),
            api,
            currency: config.currency,
        })
    }
}
