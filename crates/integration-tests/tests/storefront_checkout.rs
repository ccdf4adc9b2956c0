//! End-to-end checkout flow tests against the stub backend.

#![allow(clippy::unwrap_used)]

use tiffinbox_integration_tests::{http_client, login, spawn_storefront, spawn_stub_backend};

#[tokio::test]
async fn full_checkout_places_one_order_and_empties_the_cart() {
    let backend = spawn_stub_backend().await;
    let (item_a, item_b) = {
        let mut state = backend.state.lock().unwrap();
        (
            state.add_item("Item A", 100.0, "veg", "Main"),
            state.add_item("Item B", 50.0, "veg", "Main"),
        )
    };

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    // Two lines: A qty 2 @ 100, B qty 1 @ 50.
    for (item, quantity) in [(item_a, 2), (item_b, 1)] {
        let response = client
            .post(format!("{storefront}/cart/update"))
            .form(&[("item_id", item.to_string()), ("quantity", quantity.to_string())])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    // Address selection (inline create), then review.
    let response = client
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
    assert!(response.status().is_redirection());

    // Displayed invoice total is Σ(current price × quantity) = 250.
    let review = client
        .get(format!("{storefront}/checkout/review"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(review.contains("₹250"), "review should show ₹250");

    let response = client
        .post(format!("{storefront}/checkout/proceed"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    // The UPI payload carries the same amount, two-decimal.
    let pay = client
        .get(format!("{storefront}/checkout/pay"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(pay.contains("am=250.00"), "UPI link should request 250.00");

    // Submit with a transaction reference.
    let form = reqwest::multipart::Form::new().text("utr", "UTR12345");
    let response = client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/orders?placed="));

    let state = backend.state.lock().unwrap();
    assert_eq!(state.create_order_calls, 1);
    assert_eq!(state.orders.len(), 1);

    // The payload carried both lines with their quantities and the
    // address snapshot.
    let payload = &state.order_payloads[0];
    assert_eq!(payload["deliveryAddress"], "Ravi, Chennai, TN");
    assert_eq!(payload["pincode"], "600001");
    assert_eq!(payload["phone"], "9876543210");
    assert_eq!(payload["amount"], 250.0);
    let items = payload["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|line| line["catalogItemId"] == item_a
        && line["quantity"] == 2
        && line["priceAtOrder"] == 100.0));
    assert!(items.iter().any(|line| line["catalogItemId"] == item_b
        && line["quantity"] == 1
        && line["priceAtOrder"] == 50.0));

    // Proof landed on the order; cart read-back is empty.
    assert_eq!(state.orders[0].utr.as_deref(), Some("UTR12345"));
    assert!(state.cart_of("ravi@example.com").is_empty());
}

#[tokio::test]
async fn retry_after_proof_failure_reuses_the_created_order() {
    let backend = spawn_stub_backend().await;
    let item = {
        let mut state = backend.state.lock().unwrap();
        let id = state.add_item("Item A", 100.0, "veg", "Main");
        state.add_address("ravi@example.com", "9876543210");
        state.fail_attach_proof = true;
        id
    };

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "1".to_string())])
        .send()
        .await
        .unwrap();

    // Select the saved address.
    let address_id = {
        let state = backend.state.lock().unwrap();
        state.users["ravi@example.com"].addresses[0].id
    };
    client
        .post(format!("{storefront}/checkout/address"))
        .form(&[("address_id", address_id.to_string())])
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

    // First attempt: order creation succeeds, proof attachment fails.
    let form = reqwest::multipart::Form::new().text("utr", "UTR-1");
    let first = client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());
    let body = first.text().await.unwrap();
    assert!(
        body.contains("attaching the payment proof"),
        "failure message must name the failed step"
    );
    assert!(
        body.contains("was created"),
        "failure message must surface the already-created order"
    );
    {
        let state = backend.state.lock().unwrap();
        assert_eq!(state.create_order_calls, 1);
        assert_eq!(state.orders.len(), 1);
        // Cart clearing never ran after the proof step failed.
        assert!(!state.cart_of("ravi@example.com").is_empty());
    }

    // Second attempt resumes at proof attachment; the stub observes
    // exactly one create-order call across both submissions.
    backend.state.lock().unwrap().fail_attach_proof = false;
    let form = reqwest::multipart::Form::new().text("utr", "UTR-1");
    let second = client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(second.status().is_redirection());

    let state = backend.state.lock().unwrap();
    assert_eq!(state.create_order_calls, 1);
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.orders[0].utr.as_deref(), Some("UTR-1"));
    assert!(state.cart_of("ravi@example.com").is_empty());
}

#[tokio::test]
async fn retry_after_cart_clear_failure_skips_the_attached_proof() {
    let backend = spawn_stub_backend().await;
    let item = {
        let mut state = backend.state.lock().unwrap();
        let id = state.add_item("Item A", 100.0, "veg", "Main");
        state.add_address("ravi@example.com", "9876543210");
        state.fail_clear_cart = true;
        id
    };

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "1".to_string())])
        .send()
        .await
        .unwrap();
    let address_id = {
        let state = backend.state.lock().unwrap();
        state.users["ravi@example.com"].addresses[0].id
    };
    client
        .post(format!("{storefront}/checkout/address"))
        .form(&[("address_id", address_id.to_string())])
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

    let form = reqwest::multipart::Form::new().text("utr", "UTR-9");
    let first = client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());
    assert!(first.text().await.unwrap().contains("clearing the cart"));

    // Retry with an empty form: the proof already went through, so the
    // submission is allowed and only the cart clear re-runs.
    backend.state.lock().unwrap().fail_clear_cart = false;
    let form = reqwest::multipart::Form::new().text("utr", "");
    let second = client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(second.status().is_redirection());

    let state = backend.state.lock().unwrap();
    assert_eq!(state.create_order_calls, 1);
    assert_eq!(state.orders.len(), 1);
    // The proof from the first attempt survived; it was not re-sent blank.
    assert_eq!(state.orders[0].utr.as_deref(), Some("UTR-9"));
    assert!(state.cart_of("ravi@example.com").is_empty());
}

#[tokio::test]
async fn checkout_entry_is_unreachable_with_an_empty_cart() {
    let backend = spawn_stub_backend().await;
    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    let response = client
        .get(format!("{storefront}/checkout"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get("location").unwrap(), "/cart");
}

#[tokio::test]
async fn bad_phone_is_rejected_before_any_network_call() {
    let backend = spawn_stub_backend().await;
    let item = backend
        .state
        .lock()
        .unwrap()
        .add_item("Item A", 100.0, "veg", "Main");

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "1".to_string())])
        .send()
        .await
        .unwrap();

    // Five digits: field-level rejection, no address write reaches the
    // backend.
    let response = client
        .post(format!("{storefront}/checkout/address/new"))
        .form(&[
            ("name", "Ravi"),
            ("city", "Chennai"),
            ("state", "TN"),
            ("pincode", "600001"),
            ("phone", "12345"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("exactly 10 digits"));
    assert_eq!(backend.state.lock().unwrap().address_writes, 0);

    // Ten digits: accepted.
    let response = client
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
    assert!(response.status().is_redirection());
    assert_eq!(backend.state.lock().unwrap().address_writes, 1);
}

#[tokio::test]
async fn proof_is_required_before_submission() {
    let backend = spawn_stub_backend().await;
    let item = {
        let mut state = backend.state.lock().unwrap();
        let id = state.add_item("Item A", 100.0, "veg", "Main");
        state.add_address("ravi@example.com", "9876543210");
        id
    };

    let storefront = spawn_storefront(&backend.base_url).await;
    let client = http_client();
    login(&client, &storefront, "ravi@example.com", "Ravi").await;

    client
        .post(format!("{storefront}/cart/update"))
        .form(&[("item_id", item.to_string()), ("quantity", "1".to_string())])
        .send()
        .await
        .unwrap();
    let address_id = {
        let state = backend.state.lock().unwrap();
        state.users["ravi@example.com"].addresses[0].id
    };
    client
        .post(format!("{storefront}/checkout/address"))
        .form(&[("address_id", address_id.to_string())])
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

    // No UTR, no screenshot: nothing is submitted to the backend.
    let form = reqwest::multipart::Form::new().text("utr", "   ");
    let response = client
        .post(format!("{storefront}/checkout/submit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("transaction reference")
    );
    assert_eq!(backend.state.lock().unwrap().create_order_calls, 0);
}
