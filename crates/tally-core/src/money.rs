//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! sub-cent [`Exact`] type used for intermediate totals math.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In binary floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    $10.99 is stored as 1099. Every persisted monetary field is a    │
//! │    whole number of cents; only display converts to dollars.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a second type?
//! Percentage-of-subtotal and tax-on-discounted-subtotal produce fractional
//! cents. Rounding each intermediate step compounds drift across the
//! subtotal → discount → tax → total chain, so the engine carries those
//! values as [`Exact`] (i128, 10^8 sub-units per cent) and rounds half-up
//! exactly once, when a value is about to be stored or displayed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for signed return totals
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde transparent**: serializes as a plain integer of cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50, not -$4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion as an absolute value (0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the negated value. Used for signed return totals at the
    /// ledger boundary; `Totals` fields themselves are never negative.
    #[inline]
    pub const fn negate(&self) -> Self {
        Money(-self.0)
    }

    /// Multiplies a unit price by a quantity to produce a line total.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Subtracts `other`, clamping the result at zero.
    ///
    /// This is the `max(0, subtotal - discount)` step of the totals chain:
    /// a discount can never push the discounted subtotal negative.
    #[inline]
    pub const fn sub_or_zero(&self, other: Money) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Returns the smaller of two values.
    #[inline]
    pub const fn min(self, other: Money) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

/// Display implementation shows money in a human-readable format.
///
/// This is what receipt rendering uses; localization is a caller concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Exact (sub-cent) amounts
// =============================================================================

/// Sub-units per cent for [`Exact`] values.
///
/// 10^8 makes two chained basis-point multiplications exact: cents × bps
/// leaves a factor of 10^4, and a second × bps consumes the rest, so the
/// discount-then-tax chain never truncates before the final rounding.
const SUBCENT_SCALE: i128 = 100_000_000;

/// An intermediate monetary amount with sub-cent precision.
///
/// Produced by the discount evaluator and tax calculator; consumed by the
/// totals engine. The only way back to [`Money`] is [`Exact::round_half_up`],
/// which is the single rounding point of the whole chain.
///
/// Engine invariant: all `Exact` values in the totals chain are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Exact(i128);

impl Exact {
    /// Lifts whole cents into the sub-cent representation (lossless).
    #[inline]
    pub const fn from_money(m: Money) -> Self {
        Exact(m.cents() as i128 * SUBCENT_SCALE)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Exact(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a basis-point rate (825 = 8.25%).
    ///
    /// Exact for values produced by at most one prior `mul_bps`; see
    /// [`SUBCENT_SCALE`]. The totals chain never nests deeper than that.
    #[inline]
    pub const fn mul_bps(self, bps: u32) -> Self {
        Exact(self.0 * bps as i128 / 10_000)
    }

    /// Adds two amounts.
    #[inline]
    pub const fn add(self, other: Exact) -> Self {
        Exact(self.0 + other.0)
    }

    /// Subtracts `other`, clamping the result at zero.
    #[inline]
    pub const fn sub_or_zero(self, other: Exact) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Exact(0)
        } else {
            Exact(diff)
        }
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub const fn min(self, other: Exact) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Rounds to whole cents, half away from zero.
    ///
    /// $0.975 becomes $0.98. This is the ONLY place sub-cent precision is
    /// dropped; callers must not round-trip through `Money` mid-chain.
    #[inline]
    pub const fn round_half_up(self) -> Money {
        let half = SUBCENT_SCALE / 2;
        let cents = if self.0 >= 0 {
            (self.0 + half) / SUBCENT_SCALE
        } else {
            (self.0 - half) / SUBCENT_SCALE
        };
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_sub_or_zero_clamps() {
        let subtotal = Money::from_cents(1000);
        let discount = Money::from_cents(5000);

        assert_eq!(subtotal.sub_or_zero(discount), Money::zero());
        assert_eq!(subtotal.sub_or_zero(Money::from_cents(400)).cents(), 600);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_exact_round_half_up() {
        // 97.5 cents rounds up to 98 cents
        let tax = Exact::from_money(Money::from_cents(750)).mul_bps(1300);
        assert_eq!(tax.round_half_up().cents(), 98);

        // 97.37 cents stays at 97
        let just_under = Exact::from_money(Money::from_cents(749)).mul_bps(1300);
        assert_eq!(just_under.round_half_up().cents(), 97);
    }

    #[test]
    fn test_exact_chained_bps_is_exact() {
        // 20% off $10.00, then 13% tax on the remainder:
        // 1000 -> discounted 800 -> tax 104, no truncation anywhere.
        let subtotal = Exact::from_money(Money::from_cents(1000));
        let discount = subtotal.mul_bps(2000);
        assert_eq!(discount.round_half_up().cents(), 200);

        let tax = subtotal.sub_or_zero(discount).mul_bps(1300);
        assert_eq!(tax.round_half_up().cents(), 104);
    }

    #[test]
    fn test_exact_sub_or_zero() {
        let small = Exact::from_money(Money::from_cents(100));
        let big = Exact::from_money(Money::from_cents(500));
        assert!(small.sub_or_zero(big).is_zero());
    }
}
