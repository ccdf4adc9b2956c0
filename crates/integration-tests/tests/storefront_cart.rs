//! Cart controller round-trip tests: mutate, then trust only the re-fetch.

#![allow(clippy::unwrap_used)]

use tiffinbox_integration_tests::{http_client, login, spawn_storefront, spawn_stub_backend};

#[tokio::test]
async fn set_quantity_reads_back_exactly_what_was_set() {
    let backend = spawn_stub_backend().await;
    let item = backend
        .state
        .lock()
        .unwrap()
        .add_item("Item A", 100.0, "veg", "Main");

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    let response = client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "3".to_string())])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The rendered fragment comes from the authoritative re-read.
    let body = response.text().await.unwrap();
    assert!(body.contains("Item A"));
    assert_eq!(
        backend
            .state
            .lock()
            .unwrap()
            .cart_of("ravi@example.com")
            .get(&item),
        Some(&3)
    );
}

#[tokio::test]
async fn decrement_at_zero_issues_no_request() {
    let backend = spawn_stub_backend().await;
    let item = backend
        .state
        .lock()
        .unwrap()
        .add_item("Item A", 100.0, "veg", "Main");

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    let response = client
        .post(format!("{storefront}/cart/adjust"))
        .form(&[("item_id", item.to_string()), ("dir", "dec".to_string())])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // No quantity update ever reached the backend - in particular, no
    // negative-quantity request.
    let state = backend.state.lock().unwrap();
    assert!(state.cart_update_requests.is_empty());
    assert!(state.cart_of("ravi@example.com").is_empty());
}

#[tokio::test]
async fn negative_absolute_quantity_is_a_validation_error() {
    let backend = spawn_stub_backend().await;
    let item = backend
        .state
        .lock()
        .unwrap()
        .add_item("Item A", 100.0, "veg", "Main");

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    let response = client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "-1".to_string())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    assert!(backend.state.lock().unwrap().cart_update_requests.is_empty());
}

#[tokio::test]
async fn mutations_report_added_removed_and_updated_distinctly() {
    let backend = spawn_stub_backend().await;
    let item = backend
        .state
        .lock()
        .unwrap()
        .add_item("Item A", 100.0, "veg", "Main");

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    // 0 -> 1 is an add.
    let body = client
        .post(format!("{storefront}/cart/adjust"))
        .form(&[("item_id", item.to_string()), ("dir", "inc".to_string())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Added to cart"));

    // 1 -> 3 via absolute set is an update... of quantity upward, which
    // still reads as an add to the customer.
    let body = client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "3".to_string())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Added to cart"));

    // 3 -> 2 is an update.
    let body = client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "2".to_string())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Cart updated"));

    // 2 -> 0 is a removal.
    let body = client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "0".to_string())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Removed from cart"));
}
