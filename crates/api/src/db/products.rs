//! Product repository for database operations.

use sqlx::PgPool;
use tracing::debug;

use greengrocer_core::{Price, ProductId};

use super::{RepositoryError, constraint_conflict};
use crate::models::Product;

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products: Vec<Product> =
            sqlx::query_as("SELECT id, name, price FROM products ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product: Option<Product> =
            sqlx::query_as("SELECT id, name, price FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(product)
    }

    /// Fetch several products by ID. Missing IDs are simply absent from the
    /// result; callers compare lengths to detect them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[i32]) -> Result<Vec<Product>, RepositoryError> {
        let products: Vec<Product> =
            sqlx::query_as("SELECT id, name, price FROM products WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(self.pool)
                .await?;

        Ok(products)
    }

    /// Case-insensitive substring search on product name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{name}%");
        let products: Vec<Product> = sqlx::query_as(
            "SELECT id, name, price FROM products WHERE name ILIKE $1 ORDER BY id",
        )
        .bind(&pattern)
        .fetch_all(self.pool)
        .await?;

        debug!(query = %name, count = products.len(), "Product name search");
        Ok(products)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists,
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str, price: Price) -> Result<Product, RepositoryError> {
        let product: Product = sqlx::query_as(
            r"
            INSERT INTO products (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price
            ",
        )
        .bind(name)
        .bind(price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "product name already exists"))?;

        debug!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Update a product's name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist,
    /// `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: ProductId,
        name: &str,
        price: Price,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, price = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .execute(self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "product name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist,
    /// `RepositoryError::Conflict` if the product is still referenced by an
    /// order.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| constraint_conflict(e, "product still referenced by an order"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(product_id = %id, "Deleted product");
        Ok(())
    }
}
