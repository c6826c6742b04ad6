//! # Cart
//!
//! The ephemeral, pre-checkout container: line items, an optional discount
//! and the tax toggle. Created empty per session, mutated through the methods
//! here, and cleared on successful checkout or explicit reset.
//!
//! ## Fail Fast
//! Every mutation validates its inputs BEFORE touching state: a bad quantity
//! or price rejects the whole operation and the cart is exactly as it was.
//! Quantities are never silently clamped.

use chrono::Utc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::totals::compute_totals;
use crate::types::{
    Discount, LineItem, PaymentMethod, TaxRate, Totals, Transaction, TransactionStatus,
};
use crate::validation::{
    validate_cart_size, validate_product_id, validate_quantity, validate_unit_price,
};
use crate::MAX_CART_ITEMS;

/// An in-progress sale, before checkout.
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<LineItem>,
    discount: Option<Discount>,
    tax_enabled: bool,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates an empty cart with tax enabled (the normal register default;
    /// cashiers toggle it off for exempt sales).
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            discount: None,
            tax_enabled: true,
        }
    }

    /// The current line items, in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The attached discount, if any.
    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    /// Whether tax is enabled for this sale.
    pub fn tax_enabled(&self) -> bool {
        self.tax_enabled
    }

    /// True when the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a line, capturing the catalog price and category as a snapshot.
    /// Adding a product already in the cart merges into the existing line.
    ///
    /// The price comes from the catalog at add time and is never re-fetched;
    /// later catalog changes do not affect open carts.
    pub fn add_item(
        &mut self,
        product_id: &str,
        category: &str,
        unit_price: Money,
        quantity: i64,
    ) -> CoreResult<()> {
        let reject = |source| CoreError::InvalidLineItem {
            product_id: product_id.to_string(),
            source,
        };
        validate_product_id(product_id).map_err(reject)?;
        validate_unit_price(unit_price).map_err(reject)?;
        validate_quantity(quantity).map_err(reject)?;

        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            let merged = line.quantity + quantity;
            validate_quantity(merged).map_err(reject)?;
            line.quantity = merged;
            return Ok(());
        }

        validate_cart_size(self.items.len())
            .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_ITEMS })?;

        self.items.push(LineItem {
            product_id: product_id.to_string(),
            category: category.to_string(),
            unit_price,
            quantity,
        });
        Ok(())
    }

    /// Replaces the quantity of an existing line. Unlike the edit session,
    /// a cart update with `quantity <= 0` is an error, not a removal.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity).map_err(|source| CoreError::InvalidLineItem {
            product_id: product_id.to_string(),
            source,
        })?;

        match self.items.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound {
                id: "cart".to_string(),
                product_id: product_id.to_string(),
            }),
        }
    }

    /// Removes a line. Returns true if a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.product_id != product_id);
        self.items.len() != before
    }

    /// Attaches a discount, replacing any previous one. Applicability is not
    /// checked here; the engine re-checks it whenever totals are computed.
    pub fn apply_discount(&mut self, discount: Discount) {
        self.discount = Some(discount);
    }

    /// Detaches the discount, returning it (discarded vs. merely inactive is
    /// a caller-visible distinction).
    pub fn remove_discount(&mut self) -> Option<Discount> {
        self.discount.take()
    }

    /// Flips the tax toggle.
    pub fn toggle_tax(&mut self) {
        self.tax_enabled = !self.tax_enabled;
    }

    /// Empties the cart entirely: lines, discount, and tax back to default.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = None;
        self.tax_enabled = true;
    }

    /// Computes the current totals for display. Derived on demand; nothing
    /// is cached that could go stale against the cart contents.
    pub fn totals(&self, tax_rate: TaxRate, clock: &impl Clock) -> Totals {
        compute_totals(
            &self.items,
            self.discount.as_ref(),
            self.tax_enabled,
            tax_rate,
            clock.now(),
        )
    }

    /// Finalizes the cart into a `Completed` transaction.
    ///
    /// Rejects an empty cart with [`CoreError::EmptyCart`] before anything
    /// else happens. On success the cart is cleared; on failure it is left
    /// untouched.
    pub fn checkout(
        &mut self,
        payment_method: PaymentMethod,
        is_return: bool,
        tax_rate: TaxRate,
        clock: &impl Clock,
    ) -> CoreResult<Transaction> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let now: chrono::DateTime<Utc> = clock.now();
        let totals = compute_totals(
            &self.items,
            self.discount.as_ref(),
            self.tax_enabled,
            tax_rate,
            now,
        );

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            items: std::mem::take(&mut self.items),
            discount: self.discount.take(),
            totals,
            timestamp: now,
            payment_method,
            is_return,
            status: TransactionStatus::Completed,
            revision: 0,
        };
        self.tax_enabled = true;

        Ok(transaction)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
