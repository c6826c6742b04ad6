//! # Transaction Repository
//!
//! Database operations for transactions and their line items, and the sqlx
//! implementation of the core's `TransactionStore` trait.
//!
//! ## Write Path
//! ```text
//! save(transaction)
//!      │
//!      ├── revision 0:  INSERT (checkout)
//!      │
//!      └── revision N:  UPDATE ... WHERE id = ? AND revision = N-1
//!          │
//!          ├── 0 rows, id exists  → RevisionConflict (concurrent edit)
//!          ├── 0 rows, id missing → NotFound
//!          └── 1 row              → replace line items
//! ```
//!
//! Items are replaced wholesale inside the same SQL transaction; a failure
//! anywhere rolls the whole save back, so history never holds totals that
//! disagree with their lines.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use tally_core::error::PersistenceError;
use tally_core::money::Money;
use tally_core::store::TransactionStore;
use tally_core::types::{
    Discount, LineItem, PaymentMethod, Totals, Transaction, TransactionStatus,
};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Row types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    status: TransactionStatus,
    payment_method: PaymentMethod,
    is_return: bool,
    subtotal_cents: i64,
    discount_cents: i64,
    tax_applied: bool,
    tax_cents: i64,
    total_cents: i64,
    discount_json: Option<String>,
    created_at: DateTime<Utc>,
    revision: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    product_id: String,
    category: String,
    unit_price_cents: i64,
    quantity: i64,
}

impl TransactionRow {
    fn into_transaction(self, items: Vec<LineItem>) -> StoreResult<Transaction> {
        let discount: Option<Discount> = self
            .discount_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| StoreError::CorruptData {
                entity: "Transaction".to_string(),
                id: self.id.clone(),
                reason: format!("discount payload: {e}"),
            })?;

        Ok(Transaction {
            id: self.id,
            items,
            discount,
            totals: Totals {
                subtotal: Money::from_cents(self.subtotal_cents),
                discount_amount: Money::from_cents(self.discount_cents),
                tax_applied: self.tax_applied,
                tax: Money::from_cents(self.tax_cents),
                total: Money::from_cents(self.total_cents),
            },
            timestamp: self.created_at,
            payment_method: self.payment_method,
            is_return: self.is_return,
            status: self.status,
            revision: self.revision,
        })
    }
}

impl From<ItemRow> for LineItem {
    fn from(row: ItemRow) -> Self {
        LineItem {
            product_id: row.product_id,
            category: row.category,
            unit_price: Money::from_cents(row.unit_price_cents),
            quantity: row.quantity,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    async fn save_inner(&self, transaction: &Transaction) -> StoreResult<()> {
        debug!(
            id = %transaction.id,
            revision = transaction.revision,
            "Saving transaction"
        );

        let discount_json = transaction
            .discount
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::CorruptData {
                entity: "Transaction".to_string(),
                id: transaction.id.clone(),
                reason: format!("discount payload: {e}"),
            })?;

        let now = Utc::now();
        let mut db_tx = self.pool.begin().await?;

        if transaction.revision == 0 {
            // Fresh checkout
            sqlx::query(
                r#"
                INSERT INTO transactions (
                    id, status, payment_method, is_return,
                    subtotal_cents, discount_cents, tax_applied, tax_cents, total_cents,
                    discount_json, created_at, updated_at, revision
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(&transaction.id)
            .bind(transaction.status)
            .bind(transaction.payment_method)
            .bind(transaction.is_return)
            .bind(transaction.totals.subtotal.cents())
            .bind(transaction.totals.discount_amount.cents())
            .bind(transaction.totals.tax_applied)
            .bind(transaction.totals.tax.cents())
            .bind(transaction.totals.total.cents())
            .bind(&discount_json)
            .bind(transaction.timestamp)
            .bind(now)
            .bind(transaction.revision)
            .execute(&mut *db_tx)
            .await?;
        } else {
            // Edited save: conditional on the previous revision
            let expected = transaction.revision - 1;
            let result = sqlx::query(
                r#"
                UPDATE transactions SET
                    status = ?2,
                    payment_method = ?3,
                    is_return = ?4,
                    subtotal_cents = ?5,
                    discount_cents = ?6,
                    tax_applied = ?7,
                    tax_cents = ?8,
                    total_cents = ?9,
                    discount_json = ?10,
                    updated_at = ?11,
                    revision = ?12
                WHERE id = ?1 AND revision = ?13
                "#,
            )
            .bind(&transaction.id)
            .bind(transaction.status)
            .bind(transaction.payment_method)
            .bind(transaction.is_return)
            .bind(transaction.totals.subtotal.cents())
            .bind(transaction.totals.discount_amount.cents())
            .bind(transaction.totals.tax_applied)
            .bind(transaction.totals.tax.cents())
            .bind(transaction.totals.total.cents())
            .bind(&discount_json)
            .bind(now)
            .bind(transaction.revision)
            .bind(expected)
            .execute(&mut *db_tx)
            .await?;

            if result.rows_affected() == 0 {
                let current: Option<i64> =
                    sqlx::query_scalar("SELECT revision FROM transactions WHERE id = ?1")
                        .bind(&transaction.id)
                        .fetch_optional(&mut *db_tx)
                        .await?;

                return Err(match current {
                    Some(_) => StoreError::RevisionConflict {
                        id: transaction.id.clone(),
                        expected,
                    },
                    None => StoreError::not_found("Transaction", &transaction.id),
                });
            }

            sqlx::query("DELETE FROM transaction_items WHERE transaction_id = ?1")
                .bind(&transaction.id)
                .execute(&mut *db_tx)
                .await?;
        }

        for (position, item) in transaction.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, product_id, category,
                    unit_price_cents, quantity, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&transaction.id)
            .bind(&item.product_id)
            .bind(&item.category)
            .bind(item.unit_price.cents())
            .bind(item.quantity)
            .bind(position as i64)
            .execute(&mut *db_tx)
            .await?;
        }

        db_tx.commit().await?;
        Ok(())
    }

    async fn load_items(&self, transaction_id: &str) -> StoreResult<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT product_id, category, unit_price_cents, quantity
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    async fn load_recent_inner(&self, limit: u32) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, status, payment_method, is_return,
                   subtotal_cents, discount_cents, tax_applied, tax_cents, total_cents,
                   discount_json, created_at, revision
            FROM transactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut transactions = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(&row.id).await?;
            transactions.push(row.into_transaction(items)?);
        }
        Ok(transactions)
    }

    async fn load_by_id_inner(&self, id: &str) -> StoreResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, status, payment_method, is_return,
                   subtotal_cents, discount_cents, tax_applied, tax_cents, total_cents,
                   discount_json, created_at, revision
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.load_items(&row.id).await?;
                Ok(Some(row.into_transaction(items)?))
            }
            None => Ok(None),
        }
    }
}

impl TransactionStore for TransactionRepository {
    async fn save(&self, transaction: &Transaction) -> Result<(), PersistenceError> {
        self.save_inner(transaction)
            .await
            .map_err(|e| e.into_persistence(&transaction.id, "save"))
    }

    async fn load_recent(&self, limit: u32) -> Result<Vec<Transaction>, PersistenceError> {
        self.load_recent_inner(limit)
            .await
            .map_err(|e| e.into_persistence("(recent)", "load_recent"))
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Transaction>, PersistenceError> {
        self.load_by_id_inner(id)
            .await
            .map_err(|e| e.into_persistence(id, "load_by_id"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
