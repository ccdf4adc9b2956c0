//! Menu search/filter tests through real HTTP.

#![allow(clippy::unwrap_used)]

use tiffinbox_integration_tests::{http_client, login, spawn_storefront, spawn_stub_backend};

async fn seeded_storefront() -> (tiffinbox_integration_tests::StubBackend, String, reqwest::Client)
{
    let backend = spawn_stub_backend().await;
    {
        let mut state = backend.state.lock().unwrap();
        state.add_item("Biryani", 180.0, "non-veg", "Main");
        state.add_item("Paneer Tikka", 140.0, "veg", "Starters");
        state.add_item("Masala Dosa", 90.0, "veg", "Tiffin");
    }
    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;
    (backend, storefront, client)
}

#[tokio::test]
async fn near_miss_spelling_finds_the_dish() {
    let (_backend, storefront, client) = seeded_storefront().await;

    let body = client
        .get(format!("{storefront}/?q=bryani"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Biryani"), "fuzzy search should find Biryani");
    assert!(!body.contains("Paneer Tikka"));
    assert!(!body.contains("Masala Dosa"));
}

#[tokio::test]
async fn category_filter_is_exact_and_case_insensitive() {
    let (_backend, storefront, client) = seeded_storefront().await;

    let body = client
        .get(format!("{storefront}/?category=VEG"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Paneer Tikka"));
    assert!(body.contains("Masala Dosa"));
    assert!(
        !body.contains("Biryani"),
        "non-veg item must be excluded from the veg filter"
    );
}

#[tokio::test]
async fn inactive_items_are_hidden_from_customers() {
    let backend = spawn_stub_backend().await;
    {
        let mut state = backend.state.lock().unwrap();
        let id = state.add_item("Retired Dish", 10.0, "veg", "Main");
        state
            .catalog
            .iter_mut()
            .find(|item| item.id == id)
            .unwrap()
            .is_active = false;
        state.add_item("Live Dish", 20.0, "veg", "Main");
    }
    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    let body = client
        .get(storefront.clone())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Live Dish"));
    assert!(!body.contains("Retired Dish"));
}

#[tokio::test]
async fn order_history_totals_use_price_at_order() {
    let backend = spawn_stub_backend().await;
    let item = backend
        .state
        .lock()
        .unwrap()
        .add_item("Item A", 100.0, "veg", "Main");

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    // Place an order for 2 × ₹100 through the full flow.
    client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "2".to_string())])
        .send()
        .await
        .unwrap();
    client
        .post(format!("{storefront}/checkout/address/new"))
        .form(&[
            ("name", "Ravi"),
            ("city", "Chennai"),
            ("state", "TN"),
            ("pincode", "600001"),
            ("phone", "9876543210"),
        ])
        .send()
        .await
        .unwrap();
    client
        .get(format!("{storefront}/checkout/review"))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{storefront}/checkout/proceed"))
        .send()
        .await
        .unwrap();
    let form = reqwest::multipart::Form::new().text("utr", "UTR1");
    client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    // The kitchen raises the price afterwards.
    backend
        .state
        .lock()
        .unwrap()
        .catalog
        .iter_mut()
        .find(|i| i.id == item)
        .unwrap()
        .price = 150.0;

    let body = client
        .get(format!("{storefront}/orders"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    // Frozen at order time: 2 × ₹100 = ₹200, not 2 × ₹150 = ₹300.
    assert!(body.contains("₹200"), "history must use price-at-order");
    assert!(!body.contains("₹300"), "current price must not leak in");
}
