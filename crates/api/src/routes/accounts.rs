//! Account route handlers.
//!
//! Account-centric responses are customer-shaped but include the stored
//! password; that is the one place the secret is ever serialized.
//!
//! `/accounts/{id}` carries two meanings: on POST the path segment is the
//! customer the new account attaches to, on PUT/DELETE it is the account ID.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::validation::{validate_customer_ref, validate_password, validate_username};
use greengrocer_core::{AccountId, CustomerId};

use super::{message, require};
use crate::db::{AccountRepository, RepositoryError};
use crate::error::{ApiError, Result};
use crate::extract::{Json, Path, Query};
use crate::projections::CustomerView;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list))
        .route("/accounts/by-username", get(by_username))
        .route(
            "/accounts/{id}",
            axum::routing::post(create).put(update).delete(remove),
        )
}

/// Body for `POST /accounts/{customer_id}` and `PUT /accounts/{id}`.
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query for `GET /accounts/by-username`.
#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// List all accounts with their owning customers, passwords shown.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let pairs = AccountRepository::new(state.pool())
        .list_with_customers()
        .await?;

    let views: Vec<CustomerView> = pairs
        .into_iter()
        .map(|(account, customer)| CustomerView::revealed(customer, account))
        .collect();

    Ok(Json(views))
}

/// Attach an account to an existing customer.
///
/// A customer can hold at most one account; a second attempt answers 400.
/// An unknown customer ID surfaces as a foreign-key conflict.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
    Json(body): Json<AccountRequest>,
) -> Result<impl IntoResponse> {
    validate_customer_ref(customer_id)?;
    let customer_id = CustomerId::new(customer_id);

    let username = require(body.username, "username")?;
    let password = require(body.password, "password")?;
    validate_username(&username)?;
    validate_password(&password)?;

    let repo = AccountRepository::new(state.pool());
    if repo.exists_for_customer(customer_id).await? {
        return Err(ApiError::Value(
            "Account already exists for customer.".to_string(),
        ));
    }

    repo.create(customer_id, &username, &password).await?;

    Ok((StatusCode::CREATED, message("Account added successfully")))
}

/// Find an account by exact username. Answers a single-element array.
#[instrument(skip(state))]
pub async fn by_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let username = query.username.unwrap_or_default();

    match AccountRepository::new(state.pool())
        .get_by_username_with_customer(&username)
        .await?
    {
        Some((account, customer)) => Ok(Json(vec![CustomerView::revealed(customer, account)])),
        None => Err(ApiError::NotFound("Account not found".to_string())),
    }
}

/// Update an account's username and password.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<AccountRequest>,
) -> Result<impl IntoResponse> {
    let repo = AccountRepository::new(state.pool());
    let id = AccountId::new(id);

    if repo.get(id).await?.is_none() {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    let username = require(body.username, "username")?;
    let password = require(body.password, "password")?;
    validate_username(&username)?;
    validate_password(&password)?;

    match repo.update(id, &username, &password).await {
        Ok(()) => Ok(message("Account updated successfully!")),
        Err(RepositoryError::NotFound) => Err(ApiError::NotFound("Account not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Delete an account. The owning customer survives.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    match AccountRepository::new(state.pool())
        .delete(AccountId::new(id))
        .await
    {
        Ok(()) => Ok(message("Account successfully removed!")),
        Err(RepositoryError::NotFound) => Err(ApiError::NotFound("Account not found".to_string())),
        Err(e) => Err(e.into()),
    }
}
