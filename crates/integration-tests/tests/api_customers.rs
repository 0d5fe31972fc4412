//! Integration tests for the customer and account endpoints.
//!
//! All tests require a running API server with its database and are marked
//! `#[ignore]`; run them with `-- --ignored`.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};

use greengrocer_integration_tests::{TestContext, unique_suffix};

/// Create a customer+account with unique email/username; returns (email, username).
async fn create_customer(ctx: &TestContext) -> (String, String) {
    let suffix = unique_suffix();
    let email = format!("it-{suffix}@example.com");
    let username = format!("it_{suffix}");

    let resp = ctx
        .client
        .post(ctx.url("/customers"))
        .json(&json!({
            "name": "Integration Test",
            "email": email,
            "phone": "555-123-4567",
            "account": { "username": username, "password": "Abc12345!" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    (email, username)
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_health() {
    let ctx = TestContext::new();

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = ctx
        .client
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_customer_listing_hides_password() {
    let ctx = TestContext::new();
    let (email, username) = create_customer(&ctx).await;

    let resp = ctx
        .client
        .get(ctx.url("/customers/by-email"))
        .query(&[("email", email.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["account"]["username"], username);
    assert!(found[0]["account"].get("password").is_none());
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_account_listing_shows_password() {
    let ctx = TestContext::new();
    let (_, username) = create_customer(&ctx).await;

    let resp = ctx
        .client
        .get(ctx.url("/accounts/by-username"))
        .query(&[("username", username.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["account"]["password"], "Abc12345!");
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_duplicate_email_is_integrity_error() {
    let ctx = TestContext::new();
    let (email, _) = create_customer(&ctx).await;

    let resp = ctx
        .client
        .post(ctx.url("/customers"))
        .json(&json!({
            "name": "Duplicate",
            "email": email,
            "phone": "555-123-4567",
            "account": { "username": format!("dup_{}", unique_suffix()), "password": "Abc12345!" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Integrity error occurred.");
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_weak_password_rejected() {
    let ctx = TestContext::new();
    let suffix = unique_suffix();

    let resp = ctx
        .client
        .post(ctx.url("/customers"))
        .json(&json!({
            "name": "Weak",
            "email": format!("weak-{suffix}@example.com"),
            "phone": "555-123-4567",
            "account": { "username": format!("weak_{suffix}"), "password": "password" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_delete_customer_cascades_to_account() {
    let ctx = TestContext::new();
    let (email, username) = create_customer(&ctx).await;

    let resp = ctx
        .client
        .get(ctx.url("/customers/by-email"))
        .query(&[("email", email.as_str())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body[0]["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Both lookups now miss.
    let resp = ctx
        .client
        .get(ctx.url("/customers/by-email"))
        .query(&[("email", email.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = ctx
        .client
        .get(ctx.url("/accounts/by-username"))
        .query(&[("username", username.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_wrong_typed_body_field_answers_error_json() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.url("/customers"))
        .json(&json!({
            "name": 5,
            "email": "typed@example.com",
            "phone": "555-123-4567",
            "account": { "username": "typed_user", "password": "Abc12345!" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
#[ignore = "requires a running API server and database"]
async fn test_attach_second_account_rejected() {
    let ctx = TestContext::new();
    let (email, _) = create_customer(&ctx).await;

    let resp = ctx
        .client
        .get(ctx.url("/customers/by-email"))
        .query(&[("email", email.as_str())])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body[0]["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .post(ctx.url(&format!("/accounts/{id}")))
        .json(&json!({ "username": format!("second_{}", unique_suffix()), "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Account already exists for customer.");
}
