//! Integration tests for cart persistence through file storage.
//!
//! A store is loaded, mutated, dropped, and a second store is loaded from
//! the same directory, the way a restart of the storefront would.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId};
use rocketshoes_integration_tests::MockApi;
use rocketshoes_storefront::cart::{CartStore, UpdateProductAmount};
use rocketshoes_storefront::storage::{CART_STORAGE_KEY, FileStorage, Storage};

fn open_store(api: &MockApi, dir: &std::path::Path) -> CartStore {
    CartStore::load(api.client(), Arc::new(FileStorage::open(dir).unwrap()))
}

#[tokio::test]
async fn test_cart_survives_reload() {
    let api = MockApi::with_catalog().await;
    let dir = tempfile::tempdir().unwrap();

    let before = {
        let store = open_store(&api, dir.path());
        store.add_product(ProductId::new(2)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();
        store
            .update_product_amount(UpdateProductAmount {
                product_id: ProductId::new(2),
                amount: 4,
            })
            .await
            .unwrap()
    };

    let after = open_store(&api, dir.path()).cart().await;

    assert_eq!(after, before);
    let ids: Vec<i32> = after.items().iter().map(|item| item.id.as_i32()).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_stored_value_is_plain_json_array() {
    let api = MockApi::with_catalog().await;
    let dir = tempfile::tempdir().unwrap();

    let store = open_store(&api, dir.path());
    store.add_product(ProductId::new(3)).await.unwrap();

    let raw = FileStorage::open(dir.path())
        .unwrap()
        .get_item(CART_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let entry = &value.as_array().unwrap()[0];
    assert_eq!(entry["id"], 3);
    assert_eq!(entry["title"], "Tênis Adidas Duramo Lite 2.0");
    assert_eq!(entry["price"], 219.9);
    assert_eq!(entry["amount"], 1);
}

#[tokio::test]
async fn test_corrupt_file_loads_empty_and_is_replaced() {
    let api = MockApi::with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    FileStorage::open(dir.path())
        .unwrap()
        .set_item(CART_STORAGE_KEY, "[{\"id\": 1,")
        .unwrap();

    let store = open_store(&api, dir.path());
    assert!(store.cart().await.is_empty());

    store.add_product(ProductId::new(1)).await.unwrap();

    let reloaded = open_store(&api, dir.path()).cart().await;
    assert_eq!(reloaded.quantity_of(ProductId::new(1)), 1);
}

#[tokio::test]
async fn test_removing_last_entry_stores_empty_cart() {
    let api = MockApi::with_catalog().await;
    let dir = tempfile::tempdir().unwrap();

    let store = open_store(&api, dir.path());
    store.add_product(ProductId::new(1)).await.unwrap();
    store.remove_product(ProductId::new(1)).await.unwrap();

    let raw = FileStorage::open(dir.path())
        .unwrap()
        .get_item(CART_STORAGE_KEY)
        .unwrap();
    assert_eq!(raw.as_deref(), Some("[]"));
    assert_eq!(open_store(&api, dir.path()).cart().await, Cart::new());
}
