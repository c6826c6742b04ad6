//! # Catalog Repository
//!
//! Read-mostly product lookups. The core treats the catalog as an external
//! collaborator: it supplies `unit_price` and `category` when a cart line is
//! first created, and is never consulted again during recomputation; the
//! snapshot in the line item is authoritative from then on.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use tally_core::money::Money;

use crate::error::{StoreError, StoreResult};

/// A catalog product row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogProduct {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Display name shown to the cashier and on the receipt.
    pub name: String,
    /// Category code ("BEV", "SNK", ...).
    pub category: String,
    /// Current price in cents.
    pub price_cents: i64,
    /// Whether the product is sellable (soft delete).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogProduct {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<CatalogProduct>> {
        let product = sqlx::query_as::<_, CatalogProduct>(
            r#"
            SELECT id, name, category, price_cents, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products for UI pickers, sorted by name.
    pub async fn list_active(&self, limit: u32) -> StoreResult<Vec<CatalogProduct>> {
        let products = sqlx::query_as::<_, CatalogProduct>(
            r#"
            SELECT id, name, category, price_cents, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product and returns it. Used by the seed binary and
    /// back-office tooling.
    pub async fn insert(
        &self,
        name: &str,
        category: &str,
        price: Money,
    ) -> StoreResult<CatalogProduct> {
        if price.is_negative() {
            return Err(StoreError::Configuration(format!(
                "product {name}: negative price"
            )));
        }

        let product = CatalogProduct {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price_cents: price.cents(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, price_cents, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Soft-deletes a product (it stays referenced by historic lines).
    pub async fn deactivate(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
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

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        let soda = repo
            .insert("Soda Can", "BEV", Money::from_cents(250))
            .await
            .unwrap();

        let found = repo.get_by_id(&soda.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Soda Can");
        assert_eq!(found.price(), Money::from_cents(250));
        assert!(found.is_active);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();

        let p = repo
            .insert("Old Item", "GEN", Money::from_cents(100))
            .await
            .unwrap();
        repo.deactivate(&p.id).await.unwrap();

        let listed = repo.list_active(10).await.unwrap();
        assert!(listed.is_empty());

        // Still loadable by id for historic lines
        assert!(repo.get_by_id(&p.id).await.unwrap().is_some());
    }
}
