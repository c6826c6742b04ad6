//! # Order Totals Engine
//!
//! The single place that turns line items + discount + tax toggle into a
//! [`Totals`] record. Every call site (cart preview, checkout, edit-session
//! save, receipt rendering) goes through [`compute_totals`]; nobody
//! reimplements the chain with its own rounding or ordering.
//!
//! ## Fixed Algorithm Order
//! ```text
//! 1. subtotal  = Σ unit_price × quantity          (exact whole cents)
//! 2. discount  = evaluate(subtotal, discount, now) (sub-cent precision)
//! 3. discounted = max(0, subtotal − discount)      (sub-cent precision)
//! 4. tax       = compute_tax(discounted, rate, enabled)
//! 5. round discount and tax half-up, once each
//! 6. total     = max(0, subtotal − discount) + tax (on rounded fields)
//! ```
//!
//! Step 6 derives `total` from the already-rounded components, so the
//! invariant `total = max(0, subtotal − discount_amount) + tax` holds exactly
//! on the stored fields. The tax itself is still computed from the UNROUNDED
//! discounted subtotal, so no drift accumulates across repeated edits.
//!
//! Returns keep a non-negative `total`; the sign for ledger aggregation is
//! applied exactly once, by [`Totals::signed`] / `Transaction::signed_total`.

use chrono::{DateTime, Utc};

use crate::discount;
use crate::money::{Exact, Money};
use crate::tax;
use crate::types::{Discount, LineItem, TaxRate, Totals};

/// Computes the totals for a set of line items.
///
/// Pure and total: an empty `items` slice yields all-zero totals (only the
/// checkout and save boundaries reject empty carts), and identical inputs,
/// including `now`, yield bit-identical output.
pub fn compute_totals(
    items: &[LineItem],
    discount: Option<&Discount>,
    tax_enabled: bool,
    tax_rate: TaxRate,
    now: DateTime<Utc>,
) -> Totals {
    // Unit prices are whole cents and quantities are integers, so the
    // subtotal is exact with no rounding step.
    let subtotal: Money = items
        .iter()
        .map(LineItem::line_total)
        .fold(Money::zero(), |acc, line| acc + line);

    let discount_exact = discount::evaluate(subtotal, discount, now);
    let discounted_exact = Exact::from_money(subtotal).sub_or_zero(discount_exact);
    let tax_exact = tax::compute_tax(discounted_exact, tax_rate, tax_enabled);

    let discount_amount = discount_exact.round_half_up();
    let tax_amount = tax_exact.round_half_up();
    let total = subtotal.sub_or_zero(discount_amount) + tax_amount;

    Totals {
        subtotal,
        discount_amount,
        tax_applied: tax_enabled,
        tax: tax_amount,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn line(price_cents: i64, qty: i64) -> LineItem {
        LineItem {
            product_id: format!("p-{price_cents}-{qty}"),
            category: "GEN".to_string(),
            unit_price: Money::from_cents(price_cents),
            quantity: qty,
        }
    }

    const RATE: TaxRate = TaxRate::from_bps(1300);

    #[test]
    fn test_no_discount_tax_enabled() {
        // 3 × $2.50 = $7.50; tax 13% = $0.975 -> $0.98; total $8.48
        let items = vec![line(250, 3)];
        let totals = compute_totals(&items, None, true, RATE, now());

        assert_eq!(totals.subtotal.cents(), 750);
        assert_eq!(totals.discount_amount.cents(), 0);
        assert!(totals.tax_applied);
        assert_eq!(totals.tax.cents(), 98);
        assert_eq!(totals.total.cents(), 848);
    }

    #[test]
    fn test_percentage_discount_then_tax() {
        // $10.00, 20% off -> $8.00; tax 13% = $1.04; total $9.04
        let items = vec![line(1000, 1)];
        let d = Discount::percentage(2000, "20%").unwrap();
        let totals = compute_totals(&items, Some(&d), true, RATE, now());

        assert_eq!(totals.subtotal.cents(), 1000);
        assert_eq!(totals.discount_amount.cents(), 200);
        assert_eq!(totals.tax.cents(), 104);
        assert_eq!(totals.total.cents(), 904);
    }

    #[test]
    fn test_oversized_fixed_discount_clamps() {
        // 2 × $5.00 = $10.00; $50 off clamps to $10.00; tax disabled; total $0
        let items = vec![line(500, 2)];
        let d = Discount::fixed(Money::from_cents(5000), "$50 off").unwrap();
        let totals = compute_totals(&items, Some(&d), false, RATE, now());

        assert_eq!(totals.subtotal.cents(), 1000);
        assert_eq!(totals.discount_amount.cents(), 1000);
        assert!(!totals.tax_applied);
        assert_eq!(totals.tax.cents(), 0);
        assert_eq!(totals.total.cents(), 0);
    }

    #[test]
    fn test_return_totals_keep_magnitude() {
        // Same numbers as the undiscounted scenario; the sign is applied
        // only through Totals::signed, never stored.
        let items = vec![line(250, 3)];
        let totals = compute_totals(&items, None, true, RATE, now());

        assert_eq!(totals.total.cents(), 848);
        assert_eq!(totals.signed(true).cents(), -848);
        assert_eq!(totals.signed(false).cents(), 848);
    }

    #[test]
    fn test_empty_items_is_all_zero() {
        let totals = compute_totals(&[], None, true, RATE, now());
        assert_eq!(totals, Totals::empty(true));
    }

    #[test]
    fn test_tax_gating() {
        let items = vec![line(123_456, 7)];
        let totals = compute_totals(&items, None, false, TaxRate::from_bps(9999), now());
        assert_eq!(totals.tax.cents(), 0);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_idempotence() {
        let items = vec![line(333, 3), line(199, 2)];
        let d = Discount::percentage(1250, "12.5%").unwrap();
        let a = compute_totals(&items, Some(&d), true, RATE, now());
        let b = compute_totals(&items, Some(&d), true, RATE, now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_totals_identity_holds_after_rounding() {
        // Awkward numbers: 33.35% of $10.00 = $3.335 -> $3.34 rounded.
        // The identity must hold on the rounded fields regardless.
        let items = vec![line(1000, 1)];
        let d = Discount::percentage(3335, "33.35%").unwrap();
        let totals = compute_totals(&items, Some(&d), true, RATE, now());

        assert_eq!(totals.discount_amount.cents(), 334);
        assert_eq!(
            totals.total,
            totals.subtotal.sub_or_zero(totals.discount_amount) + totals.tax
        );
    }

    #[test]
    fn test_tax_computed_on_unrounded_discounted_subtotal() {
        // Discount 50.5% of $1.00 = 50.5 cents; discounted = 49.5 cents.
        // Tax 13% of 49.5 = 6.435 -> 6 cents (not 13% of the rounded 49).
        let items = vec![line(100, 1)];
        let d = Discount::percentage(5050, "50.5%").unwrap();
        let totals = compute_totals(&items, Some(&d), true, RATE, now());

        assert_eq!(totals.discount_amount.cents(), 51);
        assert_eq!(totals.tax.cents(), 6);
        // total derived from rounded fields: 100 - 51 + 6
        assert_eq!(totals.total.cents(), 55);
    }

    #[test]
    fn test_inapplicable_discount_contributes_zero() {
        let items = vec![line(1000, 1)];
        let d = Discount::percentage(2000, "needs $50 minimum")
            .unwrap()
            .with_subtotal_bounds(Some(Money::from_cents(5000)), None)
            .unwrap();
        let totals = compute_totals(&items, Some(&d), true, RATE, now());

        assert_eq!(totals.discount_amount.cents(), 0);
        assert_eq!(totals.total.cents(), 1130);
    }
}
