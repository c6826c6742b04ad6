//! # Tax Calculator
//!
//! Flat-rate tax on a discounted subtotal, gated by a boolean toggle.
//!
//! The rate is always supplied by the caller (ultimately from configuration);
//! no computation site carries its own hard-coded rate. That centralization is
//! deliberate: divergent per-call-site rates are exactly the bug class this
//! module exists to remove.

use crate::money::Exact;
use crate::types::TaxRate;

/// Computes tax on a discounted subtotal.
///
/// Returns zero when `enabled` is false, regardless of the rate. The input is
/// the UNROUNDED discounted subtotal and the output keeps sub-cent precision;
/// the totals engine rounds once at the end of the chain.
///
/// Pure function: deterministic in (discounted_subtotal, rate, enabled).
#[inline]
pub fn compute_tax(discounted_subtotal: Exact, rate: TaxRate, enabled: bool) -> Exact {
    if !enabled {
        return Exact::zero();
    }

    discounted_subtotal.mul_bps(rate.bps())
}

// =============================================================================
// Unit Tests
// =============================================================================
