//! Login-edge reconciliation between the local and remote carts.
//!
//! Each test runs a fresh in-process mock API and a fresh profile
//! directory, so tests are independent and never touch the network.

use std::collections::HashMap;
use std::sync::Arc;

use fashionhub_cart::storage::LocalCartStore;
use fashionhub_cart::{AccessToken, CartStore};
use fashionhub_core::{Product, ProductId};
use fashionhub_integration_tests::{MockApi, RecordingNotifier, TEST_TOKEN, test_config};

fn product(id: i64, stock_m: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: "25.00".parse().expect("decimal"),
        sizes: vec!["S".to_string(), "M".to_string()],
        stock: HashMap::from([("M".to_string(), stock_m), ("S".to_string(), 5)]),
    }
}

fn open_store(api: &MockApi, dir: &std::path::Path) -> (CartStore, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = CartStore::open(&test_config(api, dir), notifier.clone()).expect("open store");
    (store, notifier)
}

#[tokio::test]
async fn test_local_cart_syncs_to_server_on_login() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let p = product(5, 10);
    api.insert_product(&p);

    let (mut store, _notifier) = open_store(&api, dir.path());
    store.add_item(&p, "M", 2, Vec::new()).await;
    assert!(dir.path().join("cart.json").exists());

    store.sign_in(AccessToken::new(TEST_TOKEN)).await;

    assert!(store.is_authenticated());
    assert_eq!(api.cart_quantity(5, "M"), Some(2));
    assert_eq!(store.total_items(), 2);
    // Fully synced, so the local record is gone.
    assert!(!dir.path().join("cart.json").exists());
}

#[tokio::test]
async fn test_overlapping_lines_merge_by_sum_on_server() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let p = product(1, 10);
    api.insert_product(&p);
    api.seed_cart_line(&p, "M", 3);

    let (mut store, _notifier) = open_store(&api, dir.path());
    store.add_item(&p, "M", 2, Vec::new()).await;

    store.sign_in(AccessToken::new(TEST_TOKEN)).await;

    assert_eq!(api.cart_quantity(1, "M"), Some(5));
    assert_eq!(store.total_items(), 5);
}

#[tokio::test]
async fn test_duplicate_sign_in_syncs_once() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let p = product(1, 10);
    api.insert_product(&p);

    let (mut store, _notifier) = open_store(&api, dir.path());
    store.add_item(&p, "M", 2, Vec::new()).await;

    store.sign_in(AccessToken::new(TEST_TOKEN)).await;
    store.sign_in(AccessToken::new(TEST_TOKEN)).await;

    assert_eq!(api.cart_quantity(1, "M"), Some(2));
}

#[tokio::test]
async fn test_login_logout_login_does_not_duplicate_lines() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let p = product(1, 10);
    api.insert_product(&p);

    let (mut store, _notifier) = open_store(&api, dir.path());
    store.add_item(&p, "M", 2, Vec::new()).await;

    store.sign_in(AccessToken::new(TEST_TOKEN)).await;
    store.log_out().await;
    // Anonymous again, local record gone, cart empty.
    assert!(!store.is_authenticated());
    assert_eq!(store.total_items(), 0);

    store.sign_in(AccessToken::new(TEST_TOKEN)).await;
    assert_eq!(api.cart_quantity(1, "M"), Some(2));
    assert_eq!(store.total_items(), 2);
}

#[tokio::test]
async fn test_failed_sync_lines_stay_local() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let good = product(1, 10);
    let bad = product(2, 10);
    api.insert_product(&good);
    api.insert_product(&bad);
    api.fail_adds_for(2);

    let (mut store, _notifier) = open_store(&api, dir.path());
    store.add_item(&good, "M", 1, Vec::new()).await;
    store.add_item(&bad, "M", 1, Vec::new()).await;

    store.sign_in(AccessToken::new(TEST_TOKEN)).await;

    assert!(store.is_authenticated());
    assert_eq!(api.cart_quantity(1, "M"), Some(1));
    assert_eq!(api.cart_quantity(2, "M"), None);

    // The unsynced line is kept locally for a later attempt.
    let local = LocalCartStore::new(dir.path(), chrono::Duration::days(30));
    let kept = local.load().expect("load local");
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.first().map(|l| l.product_id), Some(ProductId::new(2)));
}

#[tokio::test]
async fn test_rejected_token_stays_on_local_cart() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let p = product(1, 10);
    api.insert_product(&p);

    let (mut store, notifier) = open_store(&api, dir.path());
    store.add_item(&p, "M", 2, Vec::new()).await;
    notifier.take();

    store.sign_in(AccessToken::new("bogus")).await;

    assert!(!store.is_authenticated());
    assert_eq!(store.total_items(), 2);
    assert!(api.cart_lines().is_empty());
    // The auth failure is silent, not a user-facing error.
    assert!(notifier.take().is_empty());
}

#[tokio::test]
async fn test_logout_leaves_remote_cart_untouched() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let p = product(1, 10);
    api.insert_product(&p);

    let (mut store, _notifier) = open_store(&api, dir.path());
    store.sign_in(AccessToken::new(TEST_TOKEN)).await;
    store.add_item(&p, "M", 1, Vec::new()).await;

    store.log_out().await;

    assert!(!store.is_authenticated());
    assert_eq!(store.total_items(), 0);
    assert_eq!(api.cart_quantity(1, "M"), Some(1));
}
