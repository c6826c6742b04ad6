//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐  │
//! │  │   LineItem   │  │   Discount   │  │       Transaction        │  │
//! │  │  ──────────  │  │  ──────────  │  │  ──────────────────────  │  │
//! │  │  product_id  │  │  kind        │  │  id (UUID)               │  │
//! │  │  category    │  │  description │  │  items: Vec<LineItem>    │  │
//! │  │  unit_price  │  │  min/max     │  │  discount, totals        │  │
//! │  │  quantity    │  │  window      │  │  status, revision        │  │
//! │  └──────────────┘  └──────────────┘  └──────────────────────────┘  │
//! │                                                                     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐  │
//! │  │   TaxRate    │  │    Totals    │  │  TransactionStatus       │  │
//! │  │  bps (u32)   │  │  derived,    │  │  PaymentMethod           │  │
//! │  │  1300=13%    │  │  never set   │  │  (enums)                 │  │
//! │  └──────────────┘  └──────────────┘  └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 1300 bps = 13%.
/// The canonical rate lives in configuration and is passed in; no computation
/// site hard-codes its own rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if the tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line in a cart or transaction.
///
/// Uses the snapshot pattern: `unit_price` and `category` are captured from
/// the catalog when the line is first created and are never re-fetched, so
/// later catalog price changes do not retroactively change open carts or
/// persisted history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product this line refers to.
    pub product_id: String,
    /// Category at time of capture (frozen).
    pub category: String,
    /// Unit price at time of capture (frozen).
    pub unit_price: Money,
    /// Quantity sold; always >= 1 inside a cart or transaction.
    pub quantity: i64,
}

impl LineItem {
    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// What kind of reduction a discount applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DiscountKind {
    /// Percentage of the subtotal, in basis points (2000 = 20%).
    Percentage(u32),
    /// Fixed amount off, clamped to the subtotal it discounts.
    Fixed(Money),
}

/// A discount specification attached to a cart or transaction.
///
/// A value object: no identity of its own, owned by exactly one cart or
/// transaction at a time. Construct through [`Discount::percentage`] or
/// [`Discount::fixed`] so the value invariants hold by construction.
///
/// Applicability (subtotal bounds, validity window) is NOT checked here; the
/// evaluator re-checks it at totals-computation time so an expired discount is
/// kept on the transaction but contributes zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Percentage or fixed amount.
    #[serde(flatten)]
    pub kind: DiscountKind,
    /// Human-readable label shown on receipts ("Staff 20%").
    pub description: String,
    /// Inapplicable when the subtotal is below this bound.
    pub min_applicable_subtotal: Option<Money>,
    /// Inapplicable when the subtotal is above this bound.
    pub max_applicable_subtotal: Option<Money>,
    /// Inapplicable before this instant.
    pub valid_from: Option<DateTime<Utc>>,
    /// Inapplicable after this instant.
    pub valid_to: Option<DateTime<Utc>>,
}

impl Discount {
    /// Creates a percentage discount. `bps` must be in (0, 10000].
    pub fn percentage(bps: u32, description: impl Into<String>) -> Result<Self, ValidationError> {
        if bps == 0 || bps > 10_000 {
            return Err(ValidationError::OutOfRange {
                field: "discount percentage".to_string(),
                min: 1,
                max: 10_000,
            });
        }
        Ok(Discount {
            kind: DiscountKind::Percentage(bps),
            description: description.into(),
            min_applicable_subtotal: None,
            max_applicable_subtotal: None,
            valid_from: None,
            valid_to: None,
        })
    }

    /// Creates a fixed-amount discount. `amount` must be positive.
    pub fn fixed(amount: Money, description: impl Into<String>) -> Result<Self, ValidationError> {
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "discount amount".to_string(),
            });
        }
        Ok(Discount {
            kind: DiscountKind::Fixed(amount),
            description: description.into(),
            min_applicable_subtotal: None,
            max_applicable_subtotal: None,
            valid_from: None,
            valid_to: None,
        })
    }

    /// Restricts the discount to a subtotal range. `min` must not exceed `max`
    /// when both are set.
    pub fn with_subtotal_bounds(
        mut self,
        min: Option<Money>,
        max: Option<Money>,
    ) -> Result<Self, ValidationError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ValidationError::InvalidFormat {
                    field: "discount subtotal bounds".to_string(),
                    reason: "minimum exceeds maximum".to_string(),
                });
            }
        }
        self.min_applicable_subtotal = min;
        self.max_applicable_subtotal = max;
        Ok(self)
    }

    /// Restricts the discount to a validity window. `from` must not exceed
    /// `to` when both are set.
    pub fn with_validity_window(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(lo), Some(hi)) = (from, to) {
            if lo > hi {
                return Err(ValidationError::InvalidFormat {
                    field: "discount validity window".to_string(),
                    reason: "valid_from is after valid_to".to_string(),
                });
            }
        }
        self.valid_from = from;
        self.valid_to = to;
        Ok(self)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Monetary totals derived from a set of line items.
///
/// Never mutated directly; always recomputed from inputs by the totals engine.
/// Invariant on the stored fields: `subtotal >= discount_amount >= 0` and
/// `total = max(0, subtotal - discount_amount) + tax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals, before discount and tax.
    pub subtotal: Money,
    /// Evaluated discount, zero when absent or inapplicable.
    pub discount_amount: Money,
    /// Whether tax was enabled for this computation.
    pub tax_applied: bool,
    /// Tax on the discounted subtotal; zero when `tax_applied` is false.
    pub tax: Money,
    /// Non-negative grand total. Sign for returns is applied by
    /// [`Totals::signed`], never stored here.
    pub total: Money,
}

impl Totals {
    /// All-zero totals for an empty item set.
    pub const fn empty(tax_applied: bool) -> Self {
        Totals {
            subtotal: Money::zero(),
            discount_amount: Money::zero(),
            tax_applied,
            tax: Money::zero(),
            total: Money::zero(),
        }
    }

    /// The signed total for ledger aggregation: negated exactly once when the
    /// transaction is a return, the magnitude otherwise.
    #[inline]
    pub const fn signed(&self, is_return: bool) -> Money {
        if is_return {
            self.total.negate()
        } else {
            self.total
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a transaction was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Digital,
    Check,
    StoreCredit,
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Lifecycle status of a persisted transaction.
///
/// ```text
/// Pending ──► Completed ──► Refunded        (terminal)
///    │            │  └────► PartialRefund ──► Refunded
///    │            └───────► Cancelled       (terminal)
///    └───────────────────►  Cancelled
/// ```
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting completion (e.g. held order).
    Pending,
    /// Paid and finalized; the state checkout creates.
    Completed,
    /// Voided; terminal.
    Cancelled,
    /// Fully refunded; terminal.
    Refunded,
    /// Partially refunded; still editable.
    PartialRefund,
}

impl TransactionStatus {
    /// Terminal states admit no further transitions and no edits.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Cancelled | TransactionStatus::Refunded)
    }

    /// Whether `self -> next` is a legal lifecycle step.
    pub const fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Pending, Completed)
                | (Pending, Cancelled)
                | (Completed, Refunded)
                | (Completed, PartialRefund)
                | (Completed, Cancelled)
                | (PartialRefund, Refunded)
        )
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A persisted sale (or return), created at checkout from a non-empty cart.
///
/// Mutated only through the edit session in [`crate::edit`], which always
/// re-derives `totals` and bumps `revision` on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique id, generated at checkout (UUID v4).
    pub id: String,
    /// Line items; non-empty for any persisted transaction.
    pub items: Vec<LineItem>,
    /// Optional attached discount (may currently be inapplicable).
    pub discount: Option<Discount>,
    /// Derived totals, consistent with `items`/`discount` as of last save.
    pub totals: Totals,
    /// When the transaction was created.
    pub timestamp: DateTime<Utc>,
    /// Tender used at checkout.
    pub payment_method: PaymentMethod,
    /// Return transactions keep non-negative totals; the sign is applied
    /// only at ledger aggregation.
    pub is_return: bool,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Optimistic-concurrency revision, bumped on every successful save.
    pub revision: i64,
}

impl Transaction {
    /// The signed grand total for ledger summation.
    #[inline]
    pub fn signed_total(&self) -> Money {
        self.totals.signed(self.is_return)
    }

    /// Moves the transaction to `next`, enforcing the lifecycle graph.
    pub fn transition_to(&mut self, next: TransactionStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
