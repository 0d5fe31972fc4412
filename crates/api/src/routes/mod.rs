//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                  - Liveness probe
//! GET    /health/ready                            - Readiness probe (pings the database)
//!
//! # Customers
//! GET    /customers                               - List customers (passwords hidden)
//! POST   /customers                               - Create customer + account atomically
//! GET    /customers/by-email?email=               - Find customer by email
//! PUT    /customers/{id}                          - Update customer fields
//! DELETE /customers/{id}                          - Delete customer (cascades to account and orders)
//!
//! # Accounts
//! GET    /accounts                                - List accounts (passwords shown)
//! GET    /accounts/by-username?username=          - Find account + customer
//! POST   /accounts/{id}                           - Attach account to customer {id}
//! PUT    /accounts/{id}                           - Update account {id}
//! DELETE /accounts/{id}                           - Delete account {id}
//!
//! # Products
//! GET    /products                                - List products
//! POST   /products                                - Create product
//! GET    /products/by-name?name=                  - Substring search
//! PUT    /products/{id}                           - Update product
//! DELETE /products/{id}                           - Delete product
//!
//! # Orders
//! GET    /orders                                  - List orders with totals
//! POST   /orders                                  - Create order with line items
//! GET    /orders/by-customer?username=            - List a customer's orders
//! PUT    /orders/{id}/add-product?product_id=&quantity=  - Merge line item
//! DELETE /orders/{id}/remove-product?product_id=  - Remove line item
//! DELETE /orders/{id}                             - Delete order
//! ```

pub mod accounts;
pub mod customers;
pub mod health;
pub mod orders;
pub mod products;

use axum::{Json, Router};
use serde_json::{Value, json};

use greengrocer_core::validation::ValidationError;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(customers::routes())
        .merge(accounts::routes())
        .merge(products::routes())
        .merge(orders::routes())
}

/// `{"message": <text>}` success body.
pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

/// Unwrap a required request field or fail with a field-level validation
/// error.
pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(ApiError::Validation(ValidationError::Required { field }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body_shape() {
        let Json(body) = message("done");
        assert_eq!(body, json!({ "message": "done" }));
    }

    #[test]
    fn test_require_present() {
        assert_eq!(require(Some(5), "quantity").unwrap(), 5);
    }

    #[test]
    fn test_require_missing() {
        let err = require::<i32>(None, "quantity").unwrap_err();
        assert_eq!(err.to_string(), "quantity must not be empty");
    }
}
