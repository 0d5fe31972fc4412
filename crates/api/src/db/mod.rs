//! Database operations for the Greengrocer `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `customers` - Customer identity and contact fields
//! - `customer_accounts` - One login account per customer
//! - `products` - Catalog with unique names and positive prices
//! - `orders` - Order headers referencing a customer
//! - `order_products` - (order, product, quantity) association rows
//!
//! All queries use the runtime `sqlx::query`/`query_as` API with bound
//! parameters. Multi-statement writes take place inside a transaction
//! begun by the repository method; dropping the transaction on an error
//! path rolls back, so partial writes never persist.
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/api/migrations/` and run at startup.

pub mod accounts;
pub mod customers;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, dangling foreign key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map unique/foreign-key violations to [`RepositoryError::Conflict`].
///
/// The store's constraints are the final arbiter under concurrency; any
/// violation they raise is reported as an integrity conflict rather than
/// retried.
pub(crate) fn constraint_conflict(err: sqlx::Error, context: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(context.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
