//! Cart store against the fake shop over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::Method;
use sofahub_core::{CartItemId, Price, VariationId};
use sofahub_integration_tests::FakeShop;
use sofahub_storefront::api::ApiClient;
use sofahub_storefront::cart::{CartError, CartStore, SESSION_STORAGE_KEY};
use sofahub_storefront::storage::{ClientStorage, FileStorage, MemoryStorage};

fn store(shop: &FakeShop) -> CartStore<ApiClient> {
    CartStore::new(shop.client(), Arc::new(MemoryStorage::new()))
}

#[tokio::test]
async fn test_add_then_update_quantity() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);

    cart.add_to_cart(VariationId::new(5), 2).await.unwrap();
    let snapshot = cart.cart().unwrap();
    assert_eq!(snapshot.total_items, 2);
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].quantity, 2);
    assert_eq!(snapshot.subtotal, Price::from_shillings(90_000));

    cart.update_quantity(snapshot.items[0].id, 3).await.unwrap();
    let snapshot = cart.cart().unwrap();
    assert_eq!(snapshot.total_items, 3);
    assert_eq!(snapshot.items[0].total_price, Price::from_shillings(135_000));
}

#[tokio::test]
async fn test_requests_carry_session_and_content_type() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);
    let session_id = cart.get_session_id();

    cart.add_to_cart(VariationId::new(5), 1).await.unwrap();

    let requests = shop.requests();
    let add = requests.iter().find(|r| r.path == "/cart/add/").unwrap();
    assert_eq!(add.method, Method::POST);
    assert_eq!(add.content_type.as_deref(), Some("application/json"));

    let refresh = requests.iter().rfind(|r| r.path == "/cart/").unwrap();
    assert_eq!(refresh.query.as_deref(), Some(format!("session_id={session_id}").as_str()));
}

#[tokio::test]
async fn test_zero_quantity_sends_nothing() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);

    assert!(matches!(
        cart.add_to_cart(VariationId::new(5), 0).await,
        Err(CartError::InvalidQuantity(0))
    ));
    assert!(matches!(
        cart.update_quantity(CartItemId::new(1), 0).await,
        Err(CartError::InvalidQuantity(0))
    ));
    assert!(shop.requests().is_empty());
}

#[tokio::test]
async fn test_out_of_stock_add_surfaces_error() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);

    let err = cart.add_to_cart(VariationId::new(7), 1).await.unwrap_err();

    assert_eq!(err.user_message(), "Failed to add item to cart");
    assert_eq!(cart.state().error.as_deref(), Some("Failed to add item to cart"));
    assert_eq!(shop.count(&Method::GET, "/cart/"), 0);
}

#[tokio::test]
async fn test_update_failure_reloads_server_state() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);
    cart.add_to_cart(VariationId::new(5), 2).await.unwrap();
    let item_id = cart.cart().unwrap().items[0].id;

    shop.fail(Method::PATCH, "/cart/items/", 400, r#"{"error": "Insufficient stock"}"#);
    let err = cart.update_quantity(item_id, 3).await.unwrap_err();

    assert_eq!(err.user_message(), "Failed to update item quantity");
    let state = cart.state();
    assert_eq!(state.cart.unwrap().items[0].quantity, 2);
    assert_eq!(state.error.as_deref(), Some("Failed to update item quantity"));
}

#[tokio::test]
async fn test_remove_failure_restores_snapshot() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);
    cart.add_to_cart(VariationId::new(5), 1).await.unwrap();
    cart.add_to_cart(VariationId::new(6), 2).await.unwrap();
    let before = cart.cart().unwrap();

    shop.fail(Method::DELETE, "/cart/items/", 500, "Internal Server Error");
    let err = cart.remove_from_cart(before.items[1].id).await.unwrap_err();

    assert_eq!(err.user_message(), "Failed to remove item from cart");
    assert_eq!(cart.cart().unwrap(), before);

    shop.recover();
    cart.remove_from_cart(before.items[1].id).await.unwrap();
    let after = cart.cart().unwrap();
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.total_items, 1);
}

#[tokio::test]
async fn test_clear_cart_then_refresh_is_empty() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);
    cart.add_to_cart(VariationId::new(5), 1).await.unwrap();
    let old_session = cart.get_session_id();

    cart.clear_cart().await.unwrap();
    cart.refresh_cart().await.unwrap();

    assert!(cart.cart().unwrap().items.is_empty());
    assert_ne!(cart.get_session_id(), old_session);
    assert_eq!(shop.cart_lines(&old_session), 1);
}

#[tokio::test]
async fn test_session_survives_in_file_storage() {
    let shop = FakeShop::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = CartStore::new(shop.client(), Arc::new(FileStorage::new(&path)));
    first.add_to_cart(VariationId::new(5), 1).await.unwrap();

    let second = CartStore::new(shop.client(), Arc::new(FileStorage::new(&path)));
    second.refresh_cart().await.unwrap();
    assert_eq!(second.cart().unwrap().total_items, 1);
    assert_eq!(
        FileStorage::new(&path).get(SESSION_STORAGE_KEY).unwrap(),
        Some(first.get_session_id())
    );
}

#[tokio::test]
async fn test_corrupt_session_file_keeps_one_session() {
    let shop = FakeShop::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();

    let cart = CartStore::new(shop.client(), Arc::new(FileStorage::new(&path)));
    let session_id = cart.get_session_id();
    cart.add_to_cart(VariationId::new(5), 2).await.unwrap();

    assert_eq!(cart.get_session_id(), session_id);
    assert_eq!(cart.cart().unwrap().total_items, 2);
    assert_eq!(shop.cart_lines(&session_id), 1);
}

#[tokio::test]
async fn test_cart_lines_carry_attributes() {
    let shop = FakeShop::start().await;
    let cart = store(&shop);
    cart.refresh_cart().await.unwrap();

    let backend = shop.client();
    let session_id = cart.get_session_id();
    backend.add_cart_item(&session_id, VariationId::new(6), 1).await.unwrap();
    let snapshot = backend.fetch_cart(&session_id).await.unwrap();

    let attributes = &snapshot.items[0].variation.attributes;
    assert!(attributes.has("color", &"red".into()));
    assert!(attributes.has("size", &"M".into()));
}
