//! Integration tests for the product and order endpoints.
//!
//! All tests require a running API server with its database and are marked
//! `#[ignore]`; run them with `-- --ignored`.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};

use greengrocer_integration_tests::{TestContext, unique_suffix};

/// Create a product with a unique name; returns (id, name).
async fn create_product(ctx: &TestContext, price: f64) -> (i64, String) {
    let name = format!("it-product-{}", unique_suffix());

    let resp = ctx
        .client
        .post(ctx.url("/products"))
        .json(&json!({ "name": name, "price": price }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = ctx
        .client
        .get(ctx.url("/products/by-name"))
        .query(&[("name", name.as_str())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body[0]["id"].as_i64().unwrap();

    (id, name)
}

/// Create a customer+account; returns (customer_id, username).
async fn create_customer(ctx: &TestContext) -> (i64, String) {
    let suffix = unique_suffix();
    let email = format!("it-order-{suffix}@example.com");
    let username = format!("it_order_{suffix}");

    let resp = ctx
        .client
        .post(ctx.url("/customers"))
        .json(&json!({
            "name": "Order Tester",
            "email": email,
            "phone": "555-987-6543",
            "account": { "username": username, "password": "Abc12345!" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = ctx
        .client
        .get(ctx.url("/customers/by-email"))
        .query(&[("email", email.as_str())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body[0]["id"].as_i64().unwrap();

    (id, username)
}

/// Find the tester's order in `/orders/by-customer`.
async fn orders_for(ctx: &TestContext, username: &str) -> Vec<Value> {
    let resp = ctx
        .client
        .get(ctx.url("/orders/by-customer"))
        .query(&[("username", username)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    body.as_array().unwrap().clone()
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_product_price_is_currency_formatted() {
    let ctx = TestContext::new();
    let (_, name) = create_product(&ctx, 12.5).await;

    let resp = ctx
        .client
        .get(ctx.url("/products/by-name"))
        .query(&[("name", name.as_str())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["price"], "$12.50");
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_product_search_without_match_answers_empty_list() {
    let ctx = TestContext::new();
    let needle = format!("no-such-product-{}", unique_suffix());

    let resp = ctx
        .client
        .get(ctx.url("/products/by-name"))
        .query(&[("name", needle.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_non_numeric_query_param_answers_error_json() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .put(ctx.url("/orders/1/add-product"))
        .query(&[("product_id", "abc"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("product_id"));
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_order_total_and_duplicate_merge() {
    let ctx = TestContext::new();
    let (customer_id, username) = create_customer(&ctx).await;
    let (product_id, _) = create_product(&ctx, 5.0).await;

    // The same product twice in one payload collapses to quantity 5.
    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&json!({
            "date": "2024-06-01",
            "customer_id": customer_id,
            "products": [
                { "id": product_id, "quantity": 2 },
                { "id": product_id, "quantity": 3 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let orders = orders_for(&ctx, &username).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["products"].as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["products"][0]["quantity"], 5);
    assert_eq!(orders[0]["order_total"], "$25.00");
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_add_product_merges_quantity() {
    let ctx = TestContext::new();
    let (customer_id, username) = create_customer(&ctx).await;
    let (product_id, _) = create_product(&ctx, 2.0).await;

    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&json!({
            "date": "2024-06-02",
            "customer_id": customer_id,
            "products": [{ "id": product_id, "quantity": 2 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let orders = orders_for(&ctx, &username).await;
    let order_id = orders[0]["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .put(ctx.url(&format!("/orders/{order_id}/add-product")))
        .query(&[("product_id", product_id), ("quantity", 3)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let orders = orders_for(&ctx, &username).await;
    assert_eq!(orders[0]["products"][0]["quantity"], 5);
    assert_eq!(orders[0]["order_total"], "$10.00");
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_add_product_quantity_saturates_at_int_max() {
    let ctx = TestContext::new();
    let (customer_id, username) = create_customer(&ctx).await;
    let (product_id, _) = create_product(&ctx, 1.0).await;

    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&json!({
            "date": "2024-06-05",
            "customer_id": customer_id,
            "products": [{ "id": product_id, "quantity": 2_147_483_646 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let orders = orders_for(&ctx, &username).await;
    let order_id = orders[0]["id"].as_i64().unwrap();

    // Merging past the int maximum clamps instead of erroring.
    let resp = ctx
        .client
        .put(ctx.url(&format!("/orders/{order_id}/add-product")))
        .query(&[("product_id", product_id), ("quantity", 5)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let orders = orders_for(&ctx, &username).await;
    assert_eq!(orders[0]["products"][0]["quantity"], 2_147_483_647);
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_remove_product_detaches_whole_line() {
    let ctx = TestContext::new();
    let (customer_id, username) = create_customer(&ctx).await;
    let (product_id, _) = create_product(&ctx, 3.0).await;

    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&json!({
            "date": "2024-06-03",
            "customer_id": customer_id,
            "products": [{ "id": product_id, "quantity": 4 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let orders = orders_for(&ctx, &username).await;
    let order_id = orders[0]["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/orders/{order_id}/remove-product")))
        .query(&[("product_id", product_id)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // A second removal misses.
    let resp = ctx
        .client
        .delete(ctx.url(&format!("/orders/{order_id}/remove-product")))
        .query(&[("product_id", product_id)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Product not found in order.");

    let orders = orders_for(&ctx, &username).await;
    assert_eq!(orders[0]["order_total"], "$0.00");
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_order_with_unknown_product_rejected_atomically() {
    let ctx = TestContext::new();
    let (customer_id, username) = create_customer(&ctx).await;
    let (product_id, _) = create_product(&ctx, 1.0).await;

    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&json!({
            "date": "2024-06-04",
            "customer_id": customer_id,
            "products": [
                { "id": product_id, "quantity": 1 },
                { "id": 999_999_999, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "One or more products not found.");

    // Nothing was written.
    let orders = orders_for(&ctx, &username).await;
    assert!(orders.is_empty());
}
