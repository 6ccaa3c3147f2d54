//! Integration tests for the storefront HTTP surface.
//!
//! Requests go through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`; the product service is a [`MockApi`].

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use rocketshoes_integration_tests::{MockApi, RecordingStorage, cart_store};
use rocketshoes_storefront::config::StorefrontConfig;
use rocketshoes_storefront::routes;
use rocketshoes_storefront::state::AppState;
use tower::ServiceExt;

struct TestApp {
    api: MockApi,
    storage: Arc<RecordingStorage>,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let api = MockApi::with_catalog().await;
        let storage = Arc::new(RecordingStorage::new());

        let base_url = api.base_url().to_string();
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "ROCKETSHOES_API_URL").then(|| base_url.clone())
        })
        .unwrap();

        let cart = cart_store(&api, &storage);
        let state = AppState::new(config, api.client(), cart);

        Self {
            router: routes::app(state),
            api,
            storage,
        }
    }

    async fn get(&self, uri: &str) -> Response {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post_form(&self, uri: &str, form: &str) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_value<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, "x-request-id").is_some());
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::get("/health")
        .header("x-request-id", "edge-42")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(header_value(&response, "x-request-id"), Some("edge-42"));
}

#[tokio::test]
async fn test_product_list_shows_prices_and_quantities() {
    let app = TestApp::new().await;
    app.post_form("/cart/add", "product_id=2").await;
    app.post_form("/cart/add", "product_id=2").await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Tênis de Caminhada Leve Confortável"));
    assert!(html.contains("R$ 179,90"));
    assert!(html.contains(r#"<span id="quantity-2" data-testid="cart-product-quantity">2</span>"#));
    assert!(html.contains(r#"<span id="quantity-1" data-testid="cart-product-quantity">0</span>"#));
    assert!(html.contains("1 item"));
}

#[tokio::test]
async fn test_product_list_with_service_down_is_bad_gateway() {
    let app = TestApp::new().await;
    app.api.set_failing(true);

    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_add_returns_quantity_fragment() {
    let app = TestApp::new().await;

    let response = app.post_form("/cart/add", "product_id=1").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "hx-trigger"), Some("cart-updated"));
    let html = body_text(response).await;
    assert!(html.contains(r#"id="quantity-1""#));
    assert!(html.contains(">1<"));
    assert_eq!(app.storage.writes(), 1);
}

#[tokio::test]
async fn test_add_beyond_stock_returns_toast() {
    let app = TestApp::new().await;
    // Product 5 has a single unit in stock
    app.post_form("/cart/add", "product_id=5").await;

    let response = app.post_form("/cart/add", "product_id=5").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "hx-retarget"), Some("#toast"));
    assert_eq!(header_value(&response, "hx-reswap"), Some("innerHTML"));
    assert!(header_value(&response, "hx-trigger").is_none());
    assert!(body_text(response).await.contains("Quantidade solicitada fora de estoque"));
    assert_eq!(app.storage.writes(), 1);
}

#[tokio::test]
async fn test_add_unknown_product_returns_add_failure_toast() {
    let app = TestApp::new().await;

    let response = app.post_form("/cart/add", "product_id=404").await;

    assert_eq!(header_value(&response, "hx-retarget"), Some("#toast"));
    assert!(body_text(response).await.contains("Erro na adição do produto"));
}

#[tokio::test]
async fn test_update_returns_cart_items() {
    let app = TestApp::new().await;
    app.post_form("/cart/add", "product_id=2").await;

    let response = app.post_form("/cart/update", "product_id=2&amount=3").await;

    assert_eq!(header_value(&response, "hx-trigger"), Some("cart-updated"));
    let html = body_text(response).await;
    // 3 x 139,90
    assert!(html.contains("R$ 419,70"));
}

#[tokio::test]
async fn test_update_beyond_stock_returns_toast() {
    let app = TestApp::new().await;
    app.post_form("/cart/add", "product_id=3").await;

    let response = app.post_form("/cart/update", "product_id=3&amount=9").await;

    assert!(body_text(response).await.contains("Quantidade solicitada fora de estoque"));
    assert_eq!(app.storage.stored_cart().unwrap()[0]["amount"], 1);
}

#[tokio::test]
async fn test_update_product_not_in_cart_returns_update_failure_toast() {
    let app = TestApp::new().await;

    let response = app.post_form("/cart/update", "product_id=1&amount=2").await;

    assert!(
        body_text(response)
            .await
            .contains("Erro na alteração de quantidade do produto")
    );
}

#[tokio::test]
async fn test_remove_returns_empty_cart() {
    let app = TestApp::new().await;
    app.post_form("/cart/add", "product_id=1").await;

    let response = app.post_form("/cart/remove", "product_id=1").await;

    assert_eq!(header_value(&response, "hx-trigger"), Some("cart-updated"));
    assert!(body_text(response).await.contains("Seu carrinho está vazio"));
}

#[tokio::test]
async fn test_remove_missing_returns_remove_failure_toast() {
    let app = TestApp::new().await;

    let response = app.post_form("/cart/remove", "product_id=1").await;

    assert!(body_text(response).await.contains("Erro na remoção do produto"));
}

#[tokio::test]
async fn test_cart_page_and_count() {
    let app = TestApp::new().await;
    app.post_form("/cart/add", "product_id=1").await;
    app.post_form("/cart/add", "product_id=2").await;

    let page = body_text(app.get("/cart").await).await;
    assert!(page.contains("Tênis de Caminhada Leve Confortável"));
    // 179,90 + 139,90
    assert!(page.contains("R$ 319,80"));

    let count = body_text(app.get("/cart/count").await).await;
    assert!(count.contains("2 itens"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/checkout").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.storage.writes(), 0);
}
