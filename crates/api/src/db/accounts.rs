//! Account repository for database operations.
//!
//! Account reads join back to the owning customer because the account
//! endpoints return customer-shaped projections (with the password shown).

use sqlx::{FromRow, PgPool};
use tracing::debug;

use greengrocer_core::{AccountId, CustomerId, Email, Phone};

use super::{RepositoryError, constraint_conflict};
use crate::models::{Customer, CustomerAccount};

/// One row of the account/customer INNER JOIN.
#[derive(Debug, FromRow)]
struct AccountCustomerRow {
    account_id: AccountId,
    username: String,
    password: String,
    customer_id: CustomerId,
    name: String,
    email: Email,
    phone: Phone,
}

impl AccountCustomerRow {
    fn into_pair(self) -> (CustomerAccount, Customer) {
        (
            CustomerAccount {
                id: self.account_id,
                username: self.username,
                password: self.password,
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

const ACCOUNT_WITH_CUSTOMER_SELECT: &str = r"
    SELECT a.id AS account_id, a.username, a.password, a.customer_id,
           c.name, c.email, c.phone
    FROM customer_accounts a
    INNER JOIN customers c ON c.id = a.customer_id
";

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all accounts joined with their owning customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_customers(
        &self,
    ) -> Result<Vec<(CustomerAccount, Customer)>, RepositoryError> {
        let rows: Vec<AccountCustomerRow> =
            sqlx::query_as(&format!("{ACCOUNT_WITH_CUSTOMER_SELECT} ORDER BY a.id"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(AccountCustomerRow::into_pair).collect())
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AccountId) -> Result<Option<CustomerAccount>, RepositoryError> {
        let account: Option<CustomerAccount> = sqlx::query_as(
            "SELECT id, username, password, customer_id FROM customer_accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(account)
    }

    /// Get an account and its customer by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username_with_customer(
        &self,
        username: &str,
    ) -> Result<Option<(CustomerAccount, Customer)>, RepositoryError> {
        let row: Option<AccountCustomerRow> =
            sqlx::query_as(&format!("{ACCOUNT_WITH_CUSTOMER_SELECT} WHERE a.username = $1"))
                .bind(username)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(AccountCustomerRow::into_pair))
    }

    /// Whether an account already exists for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<bool, RepositoryError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM customer_accounts WHERE customer_id = $1)",
        )
        .bind(customer_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }

    /// Attach a new account to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken or the
    /// customer already has an account, `RepositoryError::Database` for
    /// other database errors.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        username: &str,
        password: &str,
    ) -> Result<CustomerAccount, RepositoryError> {
        let account: CustomerAccount = sqlx::query_as(
            r"
            INSERT INTO customer_accounts (username, password, customer_id)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, customer_id
            ",
        )
        .bind(username)
        .bind(password)
        .bind(customer_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "username or customer account already exists"))?;

        debug!(account_id = %account.id, customer_id = %customer_id, "Created account");
        Ok(account)
    }

    /// Update an account's username and password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist,
    /// `RepositoryError::Conflict` if the new username is taken.
    pub async fn update(
        &self,
        id: AccountId,
        username: &str,
        password: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customer_accounts
            SET username = $2, password = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(username)
        .bind(password)
        .execute(self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "username already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an account by ID. The owning customer is untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    pub async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_accounts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(account_id = %id, "Deleted account");
        Ok(())
    }
}
