//! # Discount Evaluator
//!
//! Pure evaluation of a discount specification against a subtotal.
//!
//! ## Soft Failure
//! An inapplicable discount is NOT an error. `evaluate` returns a zero
//! amount and [`applicability`] reports why, so the caller can keep the
//! discount attached and show it as inactive ("discount held but currently
//! inapplicable") instead of discarding it. Removal is a separate, explicit
//! operation.

use chrono::{DateTime, Utc};

use crate::money::{Exact, Money};
use crate::types::{Discount, DiscountKind};

// =============================================================================
// Applicability
// =============================================================================

/// Why a discount does (or does not) currently apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// The discount applies in full.
    Applicable,
    /// Subtotal is below `min_applicable_subtotal`.
    BelowMinimumSubtotal,
    /// Subtotal is above `max_applicable_subtotal`.
    AboveMaximumSubtotal,
    /// `valid_from` is in the future.
    NotYetValid,
    /// `valid_to` has passed.
    Expired,
}

impl Applicability {
    /// True when the discount contributes a non-zero amount.
    #[inline]
    pub const fn is_applicable(&self) -> bool {
        matches!(self, Applicability::Applicable)
    }
}

/// Checks whether `discount` applies to `subtotal` at instant `now`.
///
/// Checks run in a fixed order (minimum, maximum, window start, window end)
/// so a discount failing several conditions reports the first one.
pub fn applicability(discount: &Discount, subtotal: Money, now: DateTime<Utc>) -> Applicability {
    if let Some(min) = discount.min_applicable_subtotal {
        if subtotal < min {
            return Applicability::BelowMinimumSubtotal;
        }
    }

    if let Some(max) = discount.max_applicable_subtotal {
        if subtotal > max {
            return Applicability::AboveMaximumSubtotal;
        }
    }

    if let Some(from) = discount.valid_from {
        if now < from {
            return Applicability::NotYetValid;
        }
    }

    if let Some(to) = discount.valid_to {
        if now > to {
            return Applicability::Expired;
        }
    }

    Applicability::Applicable
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates a discount against a subtotal, returning the sub-cent amount
/// to subtract. Zero when `discount` is absent or currently inapplicable.
///
/// - `Percentage`: subtotal × bps / 10000, NOT rounded here; the totals
///   engine rounds once at the end of the chain.
/// - `Fixed`: min(value, subtotal). A fixed discount can never exceed the
///   subtotal it discounts, so the post-discount subtotal stays non-negative.
///
/// Pure function: no side effects, deterministic in (subtotal, discount, now).
pub fn evaluate(subtotal: Money, discount: Option<&Discount>, now: DateTime<Utc>) -> Exact {
    let Some(discount) = discount else {
        return Exact::zero();
    };

    if !applicability(discount, subtotal, now).is_applicable() {
        return Exact::zero();
    }

    match discount.kind {
        DiscountKind::Percentage(bps) => Exact::from_money(subtotal).mul_bps(bps),
        DiscountKind::Fixed(amount) => Exact::from_money(amount.min(subtotal)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
