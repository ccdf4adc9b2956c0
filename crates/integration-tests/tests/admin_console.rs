//! Staff console tests: role gate, order listing, status transitions.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use tiffinbox_integration_tests::{
    StubOrder, StubOrderLine, fake_credential, http_client, login, spawn_admin,
    spawn_stub_backend,
};

fn seed_order(state: &mut tiffinbox_integration_tests::StubState, email: &str) -> i64 {
    let item = state.add_item("Biryani", 180.0, "non-veg", "Main");
    state.add_address(email, "9876543210");
    let id = 9000;
    state.orders.push(StubOrder {
        id,
        email: email.to_string(),
        status: "pending".to_string(),
        payment_status: "pending".to_string(),
        amount: 360.0,
        delivery_address: "Ravi, Chennai, TN".to_string(),
        pincode: "600001".to_string(),
        phone: Some("9876543210".to_string()),
        utr: Some("UTR777".to_string()),
        created_at: Utc::now(),
        items: vec![StubOrderLine {
            id: 1,
            item_id: item,
            quantity: 2,
            price_at_order: 180.0,
        }],
    });
    id
}

#[tokio::test]
async fn non_admin_accounts_are_turned_away() {
    let backend = spawn_stub_backend().await;
    let admin = spawn_admin(&backend.base_url).await;
    let client = http_client();

    let response = client
        .post(format!("{admin}/auth/google"))
        .form(&[("credential", fake_credential("ravi@example.com", "Ravi"))])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("error="), "customer login must be rejected");

    // And no session was stored.
    let response = client.get(format!("{admin}/orders")).send().await.unwrap();
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn admin_sees_all_orders_with_customer_snapshots() {
    let backend = spawn_stub_backend().await;
    {
        let mut state = backend.state.lock().unwrap();
        state.admins.insert("staff@example.com".to_string());
        seed_order(&mut state, "ravi@example.com");
    }
    let admin = spawn_admin(&backend.base_url).await;
    let client = http_client();
    login(&client, &admin, "staff@example.com", "Staff").await;

    let body = client
        .get(format!("{admin}/orders"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Order #9000"));
    assert!(body.contains("ravi@example.com"));
    assert!(body.contains("Biryani"));
    assert!(body.contains("UTR777"));
    assert!(body.contains("₹360"));
}

#[tokio::test]
async fn status_transition_rerenders_from_the_refetched_order() {
    let backend = spawn_stub_backend().await;
    let order_id = {
        let mut state = backend.state.lock().unwrap();
        state.admins.insert("staff@example.com".to_string());
        seed_order(&mut state, "ravi@example.com")
    };
    let admin = spawn_admin(&backend.base_url).await;
    let client = http_client();
    login(&client, &admin, "staff@example.com", "Staff").await;

    let response = client
        .post(format!("{admin}/orders/{order_id}/status"))
        .form(&[("field", "status"), ("value", "preparing")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("preparing"));

    assert_eq!(
        backend.state.lock().unwrap().orders[0].status,
        "preparing"
    );

    // Payment status is its own field with its own value set.
    let response = client
        .post(format!("{admin}/orders/{order_id}/status"))
        .form(&[("field", "payment_status"), ("value", "paid")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        backend.state.lock().unwrap().orders[0].payment_status,
        "paid"
    );
}

#[tokio::test]
async fn out_of_enumeration_values_never_reach_the_backend() {
    let backend = spawn_stub_backend().await;
    let order_id = {
        let mut state = backend.state.lock().unwrap();
        state.admins.insert("staff@example.com".to_string());
        seed_order(&mut state, "ravi@example.com")
    };
    let admin = spawn_admin(&backend.base_url).await;
    let client = http_client();
    login(&client, &admin, "staff@example.com", "Staff").await;

    for (field, value) in [
        ("status", "shipped"),
        ("status", "pending"),
        ("payment_status", "refunded"),
        ("discount", "paid"),
    ] {
        let response = client
            .post(format!("{admin}/orders/{order_id}/status"))
            .form(&[("field", field), ("value", value)])
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            "{field}={value} must be rejected"
        );
    }

    let state = backend.state.lock().unwrap();
    assert_eq!(state.orders[0].status, "pending");
    assert_eq!(state.orders[0].payment_status, "pending");
}

#[tokio::test]
async fn menu_management_round_trip() {
    let backend = spawn_stub_backend().await;
    backend
        .state
        .lock()
        .unwrap()
        .admins
        .insert("staff@example.com".to_string());
    let admin = spawn_admin(&backend.base_url).await;
    let client = http_client();
    login(&client, &admin, "staff@example.com", "Staff").await;

    // Create.
    let response = client
        .post(format!("{admin}/menu"))
        .form(&[
            ("name", "Kulfi"),
            ("description", "Frozen dessert"),
            ("price", "60"),
            ("image_url", ""),
            ("category", "veg"),
            ("section", "Dessert"),
            ("is_active", "on"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let item_id = {
        let state = backend.state.lock().unwrap();
        let item = state.catalog.iter().find(|i| i.name == "Kulfi").unwrap();
        assert!(item.is_active);
        item.id
    };

    // The listing shows it, price formatted.
    let body = client
        .get(format!("{admin}/menu"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Kulfi"));
    assert!(body.contains("₹60"));

    // Deactivate via update (unchecked box posts no is_active field).
    let response = client
        .post(format!("{admin}/menu/{item_id}"))
        .form(&[
            ("name", "Kulfi"),
            ("description", "Frozen dessert"),
            ("price", "60"),
            ("image_url", ""),
            ("category", "veg"),
            ("section", "Dessert"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert!(
        !backend
            .state
            .lock()
            .unwrap()
            .catalog
            .iter()
            .find(|i| i.id == item_id)
            .unwrap()
            .is_active
    );

    // A bad price is rejected before the backend sees it.
    let before = backend.state.lock().unwrap().catalog.len();
    let response = client
        .post(format!("{admin}/menu"))
        .form(&[
            ("name", "Broken"),
            ("description", ""),
            ("price", "sixty"),
            ("image_url", ""),
            ("category", "veg"),
            ("section", "Dessert"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response.text().await.unwrap().contains("Price must be a number"));
    assert_eq!(backend.state.lock().unwrap().catalog.len(), before);
}
