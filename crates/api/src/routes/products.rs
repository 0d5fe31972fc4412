//! Product route handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::validation::validate_product_name;
use greengrocer_core::{Price, ProductId};

use super::{message, require};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{ApiError, Result};
use crate::extract::{Json, Path, Query};
use crate::projections::ProductView;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/by-name", get(by_name))
        .route("/products/{id}", axum::routing::put(update).delete(remove))
}

/// Body for `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

/// Query for `GET /products/by-name`.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

impl ProductRequest {
    /// Validate the payload into a (name, price) pair.
    fn into_validated(self) -> Result<(String, Price)> {
        let name = require(self.name, "name")?;
        validate_product_name(&name)?;
        let price = Price::parse(require(self.price, "price")?)?;
        Ok((name, price))
    }
}

/// List all products.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list().await?;
    let views: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();

    Ok(Json(views))
}

/// Create a product.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    let (name, price) = body.into_validated()?;

    ProductRepository::new(state.pool())
        .create(&name, price)
        .await?;

    Ok((
        StatusCode::CREATED,
        message("New product added successfully!"),
    ))
}

/// Update a product's name and price.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());
    let id = ProductId::new(id);

    if repo.get(id).await?.is_none() {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    let (name, price) = body.into_validated()?;

    match repo.update(id, &name, price).await {
        Ok(()) => Ok(message("Product updated successfully!")),
        Err(RepositoryError::NotFound) => Err(ApiError::NotFound("Product not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Delete a product. A product still referenced by an order answers 400.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    match ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await
    {
        Ok(()) => Ok(message("Product successfully removed!")),
        Err(RepositoryError::NotFound) => Err(ApiError::NotFound("Product not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Case-insensitive substring search. No matches answers an empty list.
#[instrument(skip(state))]
pub async fn by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<impl IntoResponse> {
    let name = query.name.unwrap_or_default();
    let products = ProductRepository::new(state.pool())
        .search_by_name(&name)
        .await?;

    let views: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();
    Ok(Json(views))
}
