//! # Product Repository
//!
//! Database operations for inventory products.
//!
//! Products are looked up by name, case-insensitively: sales reference
//! inventory the way the counter staff type it, not by internal ID.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use motowash_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
    pub cost_cents: i64,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists products with stock on hand, ordered by name.
    ///
    /// This feeds the sale form's product picker.
    pub async fn in_stock(&self) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE stock > 0 ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Finds a product by name, case-insensitively.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE name = ?1 COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Returns the sale price for a product name, or 0 when unknown.
    ///
    /// The price-lookup endpoint deliberately answers 0 instead of 404:
    /// the sale form polls it while the user is still typing.
    pub async fn price_by_name(&self, name: &str) -> DbResult<i64> {
        let price: Option<i64> = sqlx::query_scalar(
            "SELECT price_cents FROM products WHERE name = ?1 COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price.unwrap_or(0))
    }

    /// Creates a product.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            stock: input.stock,
            price_cents: input.price_cents,
            cost_cents: input.cost_cents,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "creating product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, stock, price_cents, cost_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::UniqueViolation {
                field: "name".to_string(),
                value: product.name.clone(),
            },
            other => other,
        })?;

        Ok(product)
    }

    /// Updates a product's fields.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, stock = ?3, price_cents = ?4, cost_cents = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.stock)
        .bind(input.price_cents)
        .bind(input.cost_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))
    }

    /// Deletes a product from inventory.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn input(name: &str, stock: i64, price: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            stock,
            price_cents: price,
            cost_cents: price / 2,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_name_is_case_insensitive() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&input("Chain Oil", 5, 1500)).await.unwrap();

        let found = repo.find_by_name("chain oil").await.unwrap().unwrap();
        assert_eq!(found.name, "Chain Oil");
        assert_eq!(found.stock, 5);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&input("Wax", 1, 500)).await.unwrap();
        let err = repo.create(&input("wax", 2, 700)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_in_stock_excludes_empty_shelves() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&input("Wax", 0, 500)).await.unwrap();
        repo.create(&input("Oil", 3, 1500)).await.unwrap();

        let available = repo.in_stock().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Oil");
    }

    #[tokio::test]
    async fn test_price_by_name_defaults_to_zero() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&input("Wax", 1, 500)).await.unwrap();

        assert_eq!(repo.price_by_name("WAX").await.unwrap(), 500);
        assert_eq!(repo.price_by_name("no such thing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.create(&input("Wax", 1, 500)).await.unwrap();
        let updated = repo.update(&product.id, &input("Wax", 9, 600)).await.unwrap();
        assert_eq!(updated.stock, 9);
        assert_eq!(updated.price_cents, 600);

        repo.delete(&product.id).await.unwrap();
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&product.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
