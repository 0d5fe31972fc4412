//! Customer repository for database operations.
//!
//! Customers and their accounts are created together in one transaction;
//! deleting a customer cascades (also in one transaction) to its account,
//! its orders, and those orders' association rows.

use sqlx::{FromRow, PgPool};
use tracing::debug;

use greengrocer_core::{AccountId, CustomerId, Email, Phone};

use super::{RepositoryError, constraint_conflict};
use crate::models::{Customer, CustomerAccount};

/// One row of the customer/account LEFT JOIN.
#[derive(Debug, FromRow)]
struct CustomerAccountRow {
    id: CustomerId,
    name: String,
    email: Email,
    phone: Phone,
    account_id: Option<AccountId>,
    username: Option<String>,
    password: Option<String>,
}

impl CustomerAccountRow {
    fn into_pair(self) -> (Customer, Option<CustomerAccount>) {
        let customer = Customer {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
        };
        let account = match (self.account_id, self.username, self.password) {
            (Some(id), Some(username), Some(password)) => Some(CustomerAccount {
                id,
                username,
                password,
                customer_id: customer.id,
            }),
            _ => None,
        };
        (customer, account)
    }
}

const CUSTOMER_WITH_ACCOUNT_SELECT: &str = r"
    SELECT c.id, c.name, c.email, c.phone,
           a.id AS account_id, a.username, a.password
    FROM customers c
    LEFT JOIN customer_accounts a ON a.customer_id = c.id
";

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all customers with their optional accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_accounts(
        &self,
    ) -> Result<Vec<(Customer, Option<CustomerAccount>)>, RepositoryError> {
        let rows: Vec<CustomerAccountRow> =
            sqlx::query_as(&format!("{CUSTOMER_WITH_ACCOUNT_SELECT} ORDER BY c.id"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(CustomerAccountRow::into_pair).collect())
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer: Option<Customer> =
            sqlx::query_as("SELECT id, name, email, phone FROM customers WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(customer)
    }

    /// Get a customer and its optional account by customer ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_account(
        &self,
        id: CustomerId,
    ) -> Result<Option<(Customer, Option<CustomerAccount>)>, RepositoryError> {
        let row: Option<CustomerAccountRow> =
            sqlx::query_as(&format!("{CUSTOMER_WITH_ACCOUNT_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(CustomerAccountRow::into_pair))
    }

    /// Get a customer and its optional account by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email_with_account(
        &self,
        email: &str,
    ) -> Result<Option<(Customer, Option<CustomerAccount>)>, RepositoryError> {
        let row: Option<CustomerAccountRow> =
            sqlx::query_as(&format!("{CUSTOMER_WITH_ACCOUNT_SELECT} WHERE c.email = $1"))
                .bind(email)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(CustomerAccountRow::into_pair))
    }

    /// Create a customer and its account in one transaction.
    ///
    /// The customer row is inserted first to obtain its ID; the account row
    /// references it. Either both rows commit or neither does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username already
    /// exists, `RepositoryError::Database` for other database errors.
    pub async fn create_with_account(
        &self,
        name: &str,
        email: &Email,
        phone: &Phone,
        username: &str,
        password: &str,
    ) -> Result<(Customer, CustomerAccount), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer: Customer = sqlx::query_as(
            r"
            INSERT INTO customers (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone
            ",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_conflict(e, "email already exists"))?;

        let account: CustomerAccount = sqlx::query_as(
            r"
            INSERT INTO customer_accounts (username, password, customer_id)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, customer_id
            ",
        )
        .bind(username)
        .bind(password)
        .bind(customer.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_conflict(e, "username already exists"))?;

        tx.commit().await?;

        debug!(customer_id = %customer.id, "Created customer with account");
        Ok((customer, account))
    }

    /// Update a customer's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist,
    /// `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(
        &self,
        id: CustomerId,
        name: &str,
        email: &Email,
        phone: &Phone,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customers
            SET name = $2, email = $3, phone = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .execute(self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "email already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a customer, cascading to its account and orders.
    ///
    /// One transaction removes the customer's order association rows, its
    /// orders, its account, and finally the customer row, so no orphan or
    /// dangling reference survives.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    pub async fn delete_cascade(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM order_products
            WHERE order_id IN (SELECT id FROM orders WHERE customer_id = $1)
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM orders WHERE customer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM customer_accounts WHERE customer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        debug!(customer_id = %id, "Deleted customer with cascade");
        Ok(())
    }
}
