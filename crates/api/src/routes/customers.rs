//! Customer route handlers.
//!
//! Creation takes the customer and its account in one payload and commits
//! both or neither. Deletion cascades to the account and the customer's
//! orders. Customer-shaped responses never include the stored password.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::validation::{validate_password, validate_username};
use greengrocer_core::{CustomerId, Email, Phone};

use super::{message, require};
use crate::db::{CustomerRepository, RepositoryError};
use crate::error::{ApiError, Result};
use crate::extract::{Json, Path, Query};
use crate::projections::CustomerView;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route("/customers/by-email", get(by_email))
        .route("/customers/{id}", axum::routing::put(update).delete(remove))
}

/// Nested account payload inside a customer creation request.
#[derive(Debug, Deserialize)]
pub struct AccountPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Body for `POST /customers`.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub account: Option<AccountPayload>,
}

/// Body for `PUT /customers/{id}`. The account is not updatable here.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Query for `GET /customers/by-email`.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// List all customers, account usernames included, passwords omitted.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let pairs = CustomerRepository::new(state.pool())
        .list_with_accounts()
        .await?;

    let views: Vec<CustomerView> = pairs
        .into_iter()
        .map(|(customer, account)| CustomerView::hidden(customer, account))
        .collect();

    Ok(Json(views))
}

/// Create a customer and its account in one transaction.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse> {
    let name = require(body.name, "name")?;
    let email = Email::parse(&require(body.email, "email")?)?;
    let phone = Phone::parse(&require(body.phone, "phone")?)?;

    let account = require(body.account, "account")?;
    let username = require(account.username, "username")?;
    let password = require(account.password, "password")?;
    validate_username(&username)?;
    validate_password(&password)?;

    CustomerRepository::new(state.pool())
        .create_with_account(&name, &email, &phone, &username, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        message("New customer added successfully"),
    ))
}

/// Update a customer's name, email, and phone.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse> {
    let repo = CustomerRepository::new(state.pool());
    let id = CustomerId::new(id);

    // Existence first, so an unknown ID answers 404 even with a bad body.
    if repo.get(id).await?.is_none() {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }

    let name = require(body.name, "name")?;
    let email = Email::parse(&require(body.email, "email")?)?;
    let phone = Phone::parse(&require(body.phone, "phone")?)?;

    match repo.update(id, &name, &email, &phone).await {
        Ok(()) => Ok(message("Customer updated successfully!")),
        Err(RepositoryError::NotFound) => {
            Err(ApiError::NotFound("Customer not found".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a customer, cascading to its account and orders.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    match CustomerRepository::new(state.pool())
        .delete_cascade(CustomerId::new(id))
        .await
    {
        Ok(()) => Ok(message("Customer successfully removed!")),
        Err(RepositoryError::NotFound) => {
            Err(ApiError::NotFound("Customer not found".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Find a customer by exact email. Answers a single-element array.
#[instrument(skip(state))]
pub async fn by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse> {
    let email = query.email.unwrap_or_default();

    match CustomerRepository::new(state.pool())
        .get_by_email_with_account(&email)
        .await?
    {
        Some((customer, account)) => Ok(Json(vec![CustomerView::hidden(customer, account)])),
        None => Err(ApiError::NotFound("Customer not found".to_string())),
    }
}
