//! Integration test harness for RocketShoes.
//!
//! Tests run entirely in-process: [`MockApi`] serves the product and stock
//! endpoints on an ephemeral localhost port, and [`RecordingStorage`] stands
//! in for durable storage so tests can count writes and inject failures.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart operations against the mock service
//! - `persistence` - Cart round-trips through file storage
//! - `storefront_routes` - HTTP handlers driven through the router

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rocketshoes_core::{Product, ProductId, Stock};
use rocketshoes_storefront::api::ApiClient;
use rocketshoes_storefront::cart::CartStore;
use rocketshoes_storefront::config::ApiConfig;
use rocketshoes_storefront::storage::{CART_STORAGE_KEY, Storage, StorageError};
use url::Url;

// =============================================================================
// Mock product service
// =============================================================================

#[derive(Default)]
struct MockState {
    products: Mutex<BTreeMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, i64>>,
    failing: AtomicBool,
    stock_requests: AtomicUsize,
}

/// In-process product/stock service bound to `127.0.0.1:0`.
pub struct MockApi {
    base_url: Url,
    state: Arc<MockState>,
}

impl MockApi {
    /// Start the service with an empty catalog.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock product service");
        let addr = listener.local_addr().expect("mock service address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("mock service url");
        Self { base_url, state }
    }

    /// Start the service with the RocketShoes sample catalog.
    pub async fn with_catalog() -> Self {
        let api = Self::start().await;
        api.put_product(product(1, "Tênis de Caminhada Leve Confortável", "179.9"), 3);
        api.put_product(product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", "139.9"), 5);
        api.put_product(product(3, "Tênis Adidas Duramo Lite 2.0", "219.9"), 2);
        api.put_product(product(5, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", "139.9"), 1);
        api
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Add or replace a product and its stock level.
    pub fn put_product(&self, product: Product, stock: i64) {
        let id = product.id;
        lock(&self.state.products).insert(id, product);
        self.set_stock(id, stock);
    }

    /// Change a product's stock level.
    pub fn set_stock(&self, id: ProductId, amount: i64) {
        lock(&self.state.stock).insert(id, amount);
    }

    /// Make every endpoint answer `503 Service Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `GET /stock/{id}` requests served so far.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    /// A client for this service.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(self.base_url.clone())).expect("build api client")
    }
}

fn unavailable(state: &MockState) -> Option<Response> {
    state
        .failing
        .load(Ordering::SeqCst)
        .then(|| StatusCode::SERVICE_UNAVAILABLE.into_response())
}

async fn list_products(State(state): State<Arc<MockState>>) -> Response {
    if let Some(response) = unavailable(&state) {
        return response;
    }
    let products: Vec<Product> = lock(&state.products).values().cloned().collect();
    Json(products).into_response()
}

async fn get_product(State(state): State<Arc<MockState>>, Path(id): Path<ProductId>) -> Response {
    if let Some(response) = unavailable(&state) {
        return response;
    }
    lock(&state.products).get(&id).cloned().map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |product| Json(product).into_response(),
    )
}

async fn get_stock(State(state): State<Arc<MockState>>, Path(id): Path<ProductId>) -> Response {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = unavailable(&state) {
        return response;
    }
    lock(&state.stock).get(&id).copied().map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |amount| Json(Stock { id, amount }).into_response(),
    )
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a catalog product.
///
/// # Panics
///
/// Panics if `price` is not a decimal number.
#[must_use]
pub fn product(id: i32, title: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: price.parse().expect("decimal price"),
        image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
    }
}

// =============================================================================
// Recording storage
// =============================================================================

/// In-memory [`Storage`] that counts writes and can be told to refuse them.
#[derive(Default)]
pub struct RecordingStorage {
    items: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl RecordingStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a stored cart value.
    #[must_use]
    pub fn with_cart(json: &str) -> Self {
        let storage = Self::new();
        lock(&storage.items).insert(CART_STORAGE_KEY.to_string(), json.to_string());
        storage
    }

    /// Successful writes so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The stored cart, parsed as JSON.
    #[must_use]
    pub fn stored_cart(&self) -> Option<serde_json::Value> {
        lock(&self.items)
            .get(CART_STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

impl Storage for RecordingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        lock(&self.items).insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A cart store wired to `api` and `storage`.
#[must_use]
pub fn cart_store(api: &MockApi, storage: &Arc<RecordingStorage>) -> CartStore {
    CartStore::load(api.client(), Arc::clone(storage) as Arc<dyn Storage>)
}
