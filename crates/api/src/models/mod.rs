//! Domain types for the four entities and the order line item.
//!
//! These derive `sqlx::FromRow` so repositories can map rows directly; the
//! newtype fields (`CustomerId`, `Email`, ...) decode through their own sqlx
//! implementations in `greengrocer-core`.

use chrono::NaiveDate;
use sqlx::FromRow;

use greengrocer_core::{AccountId, CustomerId, Email, OrderId, Phone, Price, ProductId};

/// A customer. Owns zero-or-one [`CustomerAccount`] and zero-or-many orders.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Email address (unique across customers).
    pub email: Email,
    /// Phone number.
    pub phone: Phone,
}

/// A customer's login account.
///
/// The password is stored as supplied. It is only ever serialized on the
/// account-centric endpoints; customer projections omit it.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerAccount {
    /// Unique account ID.
    pub id: AccountId,
    /// Username (unique across accounts).
    pub username: String,
    /// Password, verified against the strength policy on write.
    pub password: String,
    /// Owning customer.
    pub customer_id: CustomerId,
}

/// A product in the catalog.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name (unique across products).
    pub name: String,
    /// Unit price, strictly positive.
    pub price: Price,
}

/// An order header. Line items live in the association table.
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Order date.
    #[sqlx(rename = "order_date")]
    pub date: NaiveDate,
    /// Owning customer.
    pub customer_id: CustomerId,
}

/// One (product, quantity) pair within an order, joined with product fields.
#[derive(Debug, Clone, FromRow)]
pub struct LineItem {
    /// Product referenced by this line.
    pub product_id: ProductId,
    /// Product name at read time.
    pub product_name: String,
    /// Unit price at read time.
    pub price: Price,
    /// Quantity, always >= 1; one row per (order, product).
    pub quantity: i32,
}
