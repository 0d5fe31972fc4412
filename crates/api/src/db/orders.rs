//! Order repository for database operations.
//!
//! Orders hold a header row plus association rows in `order_products`, one
//! per (order, product) with a cumulative quantity. Multi-step mutations
//! (create with line items, delete) run inside one transaction.

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use greengrocer_core::{CustomerId, Email, OrderId, Phone, Price, ProductId};

use super::{RepositoryError, constraint_conflict};
use crate::models::{Customer, LineItem, Order};

/// One row of the order/customer INNER JOIN.
#[derive(Debug, FromRow)]
struct OrderCustomerRow {
    id: OrderId,
    order_date: NaiveDate,
    customer_id: CustomerId,
    name: String,
    email: Email,
    phone: Phone,
}

impl OrderCustomerRow {
    fn into_pair(self) -> (Order, Customer) {
        (
            Order {
                id: self.id,
                date: self.order_date,
                customer_id: self.customer_id,
            },
            Customer {
                id: self.customer_id,
                name: self.name,
                email: self.email,
                phone: self.phone,
            },
        )
    }
}

/// One line-item row tagged with its order, from the association/product join.
#[derive(Debug, FromRow)]
struct OrderLineRow {
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    price: Price,
    quantity: i32,
}

const ORDER_WITH_CUSTOMER_SELECT: &str = r"
    SELECT o.id, o.order_date, o.customer_id, c.name, c.email, c.phone
    FROM orders o
    INNER JOIN customers c ON c.id = o.customer_id
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders joined with their customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_customers(&self) -> Result<Vec<(Order, Customer)>, RepositoryError> {
        let rows: Vec<OrderCustomerRow> =
            sqlx::query_as(&format!("{ORDER_WITH_CUSTOMER_SELECT} ORDER BY o.id"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(OrderCustomerRow::into_pair).collect())
    }

    /// List a customer's orders joined with the customer fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<(Order, Customer)>, RepositoryError> {
        let rows: Vec<OrderCustomerRow> = sqlx::query_as(&format!(
            "{ORDER_WITH_CUSTOMER_SELECT} WHERE o.customer_id = $1 ORDER BY o.id"
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderCustomerRow::into_pair).collect())
    }

    /// Get an order header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order: Option<Order> =
            sqlx::query_as("SELECT id, order_date, customer_id FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(order)
    }

    /// Fetch the line items for a set of orders in one query, joined with
    /// product name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_items_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<(OrderId, LineItem)>, RepositoryError> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r"
            SELECT op.order_id, op.product_id, p.name AS product_name,
                   p.price, op.quantity
            FROM order_products op
            INNER JOIN products p ON p.id = op.product_id
            WHERE op.order_id = ANY($1)
            ORDER BY op.order_id, op.product_id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.order_id,
                    LineItem {
                        product_id: r.product_id,
                        product_name: r.product_name,
                        price: r.price,
                        quantity: r.quantity,
                    },
                )
            })
            .collect())
    }

    /// Create an order and its association rows in one transaction.
    ///
    /// The order row is inserted first to obtain its ID. Callers must have
    /// already verified that every referenced product exists; a product
    /// deleted between that check and this insert surfaces as a foreign-key
    /// conflict, and the whole transaction rolls back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on constraint violations,
    /// `RepositoryError::Database` for other database errors.
    pub async fn create_with_items(
        &self,
        date: NaiveDate,
        customer_id: CustomerId,
        items: &[(ProductId, i32)],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order: Order = sqlx::query_as(
            r"
            INSERT INTO orders (order_date, customer_id)
            VALUES ($1, $2)
            RETURNING id, order_date, customer_id
            ",
        )
        .bind(date)
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_conflict(e, "customer reference is invalid"))?;

        for (product_id, quantity) in items {
            sqlx::query(
                r"
                INSERT INTO order_products (order_id, product_id, quantity)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(order.id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_conflict(e, "product reference is invalid"))?;
        }

        tx.commit().await?;

        debug!(order_id = %order.id, items = items.len(), "Created order");
        Ok(order)
    }

    /// Add a product to an order, merging cumulatively with any existing
    /// association row for the same product. The summed quantity is computed
    /// in bigint and clamped to the int4 maximum, so repeated merges saturate
    /// instead of overflowing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order or product reference
    /// is invalid, `RepositoryError::Database` for other database errors.
    pub async fn add_or_merge_product(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO order_products (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, product_id)
            DO UPDATE SET quantity = LEAST(
                order_products.quantity::bigint + EXCLUDED.quantity,
                2147483647
            )::int
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "order or product reference is invalid"))?;

        debug!(%order_id, %product_id, quantity, "Merged product into order");
        Ok(())
    }

    /// Remove a product's association row from an order, regardless of its
    /// quantity.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed, `false` if the order had no
    /// association with that product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_product(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM order_products WHERE order_id = $1 AND product_id = $2")
                .bind(order_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an order and all of its association rows in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM order_products WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        debug!(order_id = %id, "Deleted order");
        Ok(())
    }
}
