//! Order route handlers.
//!
//! Order creation verifies the customer and every referenced product before
//! any row is written, so a bad reference never leaves partial state behind.
//! Duplicate product IDs in one payload collapse into a single line item
//! with their quantities summed, matching the merge rule for later
//! add-product calls.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::validation::{validate_customer_ref, validate_quantity};
use greengrocer_core::{CustomerId, OrderId, ProductId};

use super::{message, require};
use crate::db::{AccountRepository, CustomerRepository, OrderRepository, ProductRepository};
use crate::db::RepositoryError;
use crate::error::{ApiError, Result};
use crate::extract::{Json, Path, Query};
use crate::projections::order_views;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/by-customer", get(by_customer))
        .route("/orders/{id}", axum::routing::delete(remove))
        .route("/orders/{id}/add-product", axum::routing::put(add_product))
        .route(
            "/orders/{id}/remove-product",
            axum::routing::delete(remove_product),
        )
}

/// One `{id, quantity}` entry in an order creation payload.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub id: Option<i32>,
    pub quantity: Option<i32>,
}

/// Body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub date: Option<String>,
    pub customer_id: Option<i32>,
    #[serde(default)]
    pub products: Vec<OrderItemRequest>,
}

/// Query for `PUT /orders/{id}/add-product`.
#[derive(Debug, Deserialize)]
pub struct AddProductQuery {
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

/// Query for `DELETE /orders/{id}/remove-product`.
#[derive(Debug, Deserialize)]
pub struct RemoveProductQuery {
    pub product_id: Option<i32>,
}

/// Query for `GET /orders/by-customer`.
#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub username: Option<String>,
}

/// Collapse duplicate product IDs, summing their quantities. First-seen
/// order is preserved; a summed quantity that exceeds `i32::MAX` is
/// rejected.
fn merge_quantities(items: Vec<(i32, i32)>) -> Result<Vec<(ProductId, i32)>> {
    let mut merged: Vec<(ProductId, i32)> = Vec::new();
    for (id, quantity) in items {
        let product_id = ProductId::new(id);
        if let Some(entry) = merged.iter_mut().find(|(existing, _)| *existing == product_id) {
            entry.1 = entry
                .1
                .checked_add(quantity)
                .ok_or_else(|| ApiError::Value("quantity total is too large".to_string()))?;
        } else {
            merged.push((product_id, quantity));
        }
    }
    Ok(merged)
}

/// List all orders with line items and totals.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let repo = OrderRepository::new(state.pool());

    let pairs = repo.list_with_customers().await?;
    let ids: Vec<i32> = pairs.iter().map(|(order, _)| order.id.as_i32()).collect();
    let lines = repo.line_items_for_orders(&ids).await?;

    Ok(Json(order_views(pairs, lines)))
}

/// Create an order with its line items.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    let date = require(body.date, "date")?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::Value("date must be formatted YYYY-MM-DD".to_string()))?;

    let customer_id = require(body.customer_id, "customer_id")?;
    validate_customer_ref(customer_id)?;
    let customer_id = CustomerId::new(customer_id);

    let mut items = Vec::with_capacity(body.products.len());
    for entry in body.products {
        let id = require(entry.id, "id")?;
        let quantity = require(entry.quantity, "quantity")?;
        validate_quantity(quantity)?;
        items.push((id, quantity));
    }
    let items = merge_quantities(items)?;

    // All references are verified before anything is written.
    let pool = state.pool();
    let distinct_ids: Vec<i32> = items.iter().map(|(id, _)| id.as_i32()).collect();
    let found = ProductRepository::new(pool).get_many(&distinct_ids).await?;
    if found.len() != distinct_ids.len() {
        return Err(ApiError::NotFound(
            "One or more products not found.".to_string(),
        ));
    }

    if CustomerRepository::new(pool).get(customer_id).await?.is_none() {
        return Err(ApiError::NotFound("Customer not found.".to_string()));
    }

    OrderRepository::new(pool)
        .create_with_items(date, customer_id, &items)
        .await?;

    Ok((StatusCode::CREATED, message("New order added successfully")))
}

/// Merge a product into an order, summing quantities on repeat.
#[instrument(skip(state))]
pub async fn add_product(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Query(query): Query<AddProductQuery>,
) -> Result<impl IntoResponse> {
    let (Some(product_id), Some(quantity)) = (query.product_id, query.quantity) else {
        return Err(ApiError::Value(
            "Missing product_id or quantity".to_string(),
        ));
    };
    validate_quantity(quantity)?;

    let pool = state.pool();
    let product_id = ProductId::new(product_id);
    let order_id = OrderId::new(order_id);

    if ProductRepository::new(pool).get(product_id).await?.is_none() {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    let repo = OrderRepository::new(pool);
    if repo.get(order_id).await?.is_none() {
        return Err(ApiError::NotFound("Order not found.".to_string()));
    }

    repo.add_or_merge_product(order_id, product_id, quantity)
        .await?;

    Ok(message("Product successfully added to order!"))
}

/// Remove a product's line item from an order, whatever its quantity.
#[instrument(skip(state))]
pub async fn remove_product(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Query(query): Query<RemoveProductQuery>,
) -> Result<impl IntoResponse> {
    let Some(product_id) = query.product_id else {
        return Err(ApiError::Value("Missing product_id.".to_string()));
    };

    let order_id = OrderId::new(order_id);
    let repo = OrderRepository::new(state.pool());

    if repo.get(order_id).await?.is_none() {
        return Err(ApiError::NotFound("Order not found.".to_string()));
    }

    if repo
        .remove_product(order_id, ProductId::new(product_id))
        .await?
    {
        Ok(message("Product successfully removed from order!"))
    } else {
        Err(ApiError::NotFound("Product not found in order.".to_string()))
    }
}

/// Delete an order and its line items.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    match OrderRepository::new(state.pool())
        .delete(OrderId::new(id))
        .await
    {
        Ok(()) => Ok(message("Order successfully removed!")),
        Err(RepositoryError::NotFound) => Err(ApiError::NotFound("Order not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// List the orders of the customer owning the given account username.
#[instrument(skip(state))]
pub async fn by_customer(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Result<impl IntoResponse> {
    let username = query.username.unwrap_or_default();

    let pool = state.pool();
    let Some((_, customer)) = AccountRepository::new(pool)
        .get_by_username_with_customer(&username)
        .await?
    else {
        return Err(ApiError::NotFound("Customer not found.".to_string()));
    };

    let repo = OrderRepository::new(pool);
    let orders = repo.list_by_customer(customer.id).await?;
    let ids: Vec<i32> = orders.iter().map(|(order, _)| order.id.as_i32()).collect();
    let lines = repo.line_items_for_orders(&ids).await?;

    Ok(Json(order_views(orders, lines)))
}
