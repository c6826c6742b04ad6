//! # Transaction Store Trait
//!
//! The persistence collaborator consumed by the edit session. tally-store
//! provides the SQLite implementation; tests use small in-memory fakes.
//!
//! The core calls `save` exactly once per save transition and never reads
//! back after writing. Retries, timeouts and cancellation are store policy,
//! not core policy.

use crate::error::PersistenceError;
use crate::types::Transaction;

/// Asynchronous persistence for transactions.
///
/// `save` must be atomic per transaction and must reject a revision conflict
/// with [`PersistenceError::Conflict`] rather than overwrite a concurrent
/// edit.
#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    /// Persists the transaction (insert or conditional update on revision).
    async fn save(&self, transaction: &Transaction) -> Result<(), PersistenceError>;

    /// Loads the most recent transactions, newest first.
    async fn load_recent(&self, limit: u32) -> Result<Vec<Transaction>, PersistenceError>;

    /// Loads a single transaction by id.
    async fn load_by_id(&self, id: &str) -> Result<Option<Transaction>, PersistenceError>;
}
