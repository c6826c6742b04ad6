//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  tally-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                    │
//! │  ├── ValidationError  - Input validation failures                   │
//! │  └── PersistenceError - Store failures, surfaced through the        │
//! │                         TransactionStore trait boundary             │
//! │                                                                     │
//! │  tally-store errors (separate crate)                                │
//! │  └── StoreError       - sqlx-level failures, mapped into            │
//! │                         PersistenceError before they reach core     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, not manual impls
//! 2. Context in every message (transaction id, product id, operation)
//! 3. Errors are enum variants, never strings
//! 4. Validation fails fast at the mutation boundary, leaving the cart or
//!    draft unchanged; persistence failures preserve the draft for retry

use thiserror::Error;

use crate::types::TransactionStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout or save attempted with zero line items.
    /// No transaction is created or persisted.
    #[error("cart is empty: nothing to check out")]
    EmptyCart,

    /// A cart mutation supplied a bad line (negative price, non-positive
    /// quantity, blank product id). Rejected before any state changes;
    /// never silently clamped.
    #[error("invalid line item for product {product_id}: {source}")]
    InvalidLineItem {
        product_id: String,
        #[source]
        source: ValidationError,
    },

    /// Cart has reached the maximum number of distinct lines.
    #[error("cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// The referenced line does not exist in the cart or draft.
    #[error("{id}: no line for product {product_id}")]
    LineNotFound { id: String, product_id: String },

    /// An edit operation was called while no draft exists.
    #[error("transaction {id}: no edit in progress")]
    NoActiveEdit { id: String },

    /// `begin_edit` was called while a draft already exists.
    #[error("transaction {id}: an edit is already in progress")]
    EditInProgress { id: String },

    /// `begin_edit` on a terminal-state transaction.
    #[error("transaction {id} is {status:?} and can no longer be edited")]
    TransactionLocked {
        id: String,
        status: TransactionStatus,
    },

    /// Lifecycle violation, e.g. refunding a cancelled transaction.
    #[error("transaction {id}: illegal status transition {from:?} -> {to:?}")]
    InvalidStatusTransition {
        id: String,
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Store failure, propagated with context; the caller decides on retry.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, detected before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Structurally invalid value (bad bounds ordering, bad window).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Persistence Error
// =============================================================================

/// Failures crossing the `TransactionStore` boundary.
///
/// The core never retries these; they carry enough context (transaction id,
/// operation) for the caller to decide on retry or user notification.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Optimistic-concurrency conflict: someone else saved the transaction
    /// since this draft was begun.
    #[error("transaction {id}: concurrent edit detected (expected revision {expected})")]
    Conflict { id: String, expected: i64 },

    /// The transaction no longer exists in the store.
    #[error("transaction {id}: not found")]
    NotFound { id: String },

    /// Any other backend failure.
    #[error("transaction {id}: {operation} failed: {message}")]
    Backend {
        id: String,
        operation: String,
        message: String,
    },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TransactionLocked {
            id: "tx-1".to_string(),
            status: TransactionStatus::Refunded,
        };
        assert_eq!(
            err.to_string(),
            "transaction tx-1 is Refunded and can no longer be edited"
        );

        let err = PersistenceError::Conflict {
            id: "tx-2".to_string(),
            expected: 3,
        };
        assert_eq!(
            err.to_string(),
            "transaction tx-2: concurrent edit detected (expected revision 3)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
