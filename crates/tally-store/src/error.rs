//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! SQLite error (sqlx::Error)
//!      │
//!      ▼
//! StoreError (this module)  - adds context and categorization
//!      │
//!      ▼
//! PersistenceError (tally-core) - what crosses the TransactionStore
//!                                 trait boundary back into the core
//! ```

use thiserror::Error;

use tally_core::error::PersistenceError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Optimistic-concurrency check failed: the row's revision did not
    /// match what the caller expected.
    #[error("transaction {id}: revision conflict (expected {expected})")]
    RevisionConflict { id: String, expected: i64 },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Bad configuration (missing env var, unparsable value).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Stored payload could not be decoded (e.g. corrupt discount JSON).
    #[error("corrupt stored data for {entity} {id}: {reason}")]
    CorruptData {
        entity: String,
        id: String,
        reason: String,
    },
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Maps this error into the core's `PersistenceError`, attaching the
    /// transaction id and operation name for caller context.
    pub fn into_persistence(self, id: &str, operation: &str) -> PersistenceError {
        match self {
            StoreError::RevisionConflict { id, expected } => {
                PersistenceError::Conflict { id, expected }
            }
            StoreError::NotFound { id, .. } => PersistenceError::NotFound { id },
            other => PersistenceError::Backend {
                id: id.to_string(),
                operation: operation.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("row", "unknown"),
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("connection pool exhausted".to_string())
            }
            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_persistence_conflict() {
        let err = StoreError::RevisionConflict {
            id: "tx-1".to_string(),
            expected: 2,
        };
        let mapped = err.into_persistence("tx-1", "save");
        assert!(matches!(mapped, PersistenceError::Conflict { expected: 2, .. }));
    }

    #[test]
    fn test_backend_mapping_keeps_operation_context() {
        let err = StoreError::QueryFailed("syntax".to_string());
        let mapped = err.into_persistence("tx-9", "save");
        match mapped {
            PersistenceError::Backend { id, operation, .. } => {
                assert_eq!(id, "tx-9");
                assert_eq!(operation, "save");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
