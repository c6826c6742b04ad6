//! End-to-end scenarios: cart assembly → checkout → edit → save.
//!
//! These exercise the public API the way a register flow would, with a
//! fake in-memory store standing in for tally-store.

use chrono::{TimeZone, Utc};
use std::sync::Mutex;
use tally_core::error::PersistenceError;
use tally_core::{
    Cart, Discount, EditSession, FixedClock, Money, PaymentMethod, TaxRate, Transaction,
    TransactionStatus, TransactionStore,
};

const RATE: TaxRate = TaxRate::from_bps(1300);

fn clock() -> FixedClock {
    FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

/// Append-only in-memory store; the latest entry per id wins on load.
#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<Transaction>>,
}

impl TransactionStore for MemoryStore {
    async fn save(&self, transaction: &Transaction) -> Result<(), PersistenceError> {
        self.saved.lock().unwrap().push(transaction.clone());
        Ok(())
    }

    async fn load_recent(&self, limit: u32) -> Result<Vec<Transaction>, PersistenceError> {
        let saved = self.saved.lock().unwrap();
        Ok(saved.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Transaction>, PersistenceError> {
        let saved = self.saved.lock().unwrap();
        Ok(saved.iter().rev().find(|t| t.id == id).cloned())
    }
}

#[test]
fn receipt_scenario_basket_with_discount_and_tax() {
    // Basket: 3 × $2.50 sodas, 1 × $10.00 snack box, 20% staff discount.
    let mut cart = Cart::new();
    cart.add_item("soda", "BEV", Money::from_cents(250), 3).unwrap();
    cart.add_item("snackbox", "SNK", Money::from_cents(1000), 1).unwrap();
    cart.apply_discount(Discount::percentage(2000, "Staff 20%").unwrap());

    let totals = cart.totals(RATE, &clock());

    // subtotal $17.50; 20% = $3.50; discounted $14.00; tax $1.82; total $15.82
    assert_eq!(totals.subtotal.cents(), 1750);
    assert_eq!(totals.discount_amount.cents(), 350);
    assert_eq!(totals.tax.cents(), 182);
    assert_eq!(totals.total.cents(), 1582);

    assert_eq!(totals.total.to_string(), "$15.82");
}

#[tokio::test]
async fn full_flow_checkout_then_edit_quantity() {
    let store = MemoryStore::default();

    let mut cart = Cart::new();
    cart.add_item("soda", "BEV", Money::from_cents(250), 3).unwrap();
    let tx = cart.checkout(PaymentMethod::Cash, false, RATE, &clock()).unwrap();
    store.save(&tx).await.unwrap();

    let id = tx.id.clone();
    assert_eq!(tx.totals.total.cents(), 848);

    // Later: cashier loads the transaction and bumps the quantity to 4.
    let loaded = store.load_by_id(&id).await.unwrap().unwrap();
    let mut session = EditSession::new(loaded);
    session.begin_edit().unwrap();
    session.set_item_quantity("soda", 4).unwrap();
    let saved = session.save(&store, RATE, &clock()).await.unwrap();

    // 4 × $2.50 = $10.00; tax $1.30; total $11.30; revision bumped.
    assert_eq!(saved.totals.total.cents(), 1130);
    assert_eq!(saved.revision, 1);

    let reread = store.load_by_id(&id).await.unwrap().unwrap();
    assert_eq!(reread.totals.total.cents(), 1130);
}

#[tokio::test]
async fn return_flow_ledger_aggregation_applies_sign_once() {
    let store = MemoryStore::default();

    // One sale and one return of the same basket.
    for is_return in [false, true] {
        let mut cart = Cart::new();
        cart.add_item("soda", "BEV", Money::from_cents(250), 3).unwrap();
        let tx = cart
            .checkout(PaymentMethod::Cash, is_return, RATE, &clock())
            .unwrap();
        store.save(&tx).await.unwrap();
    }

    let all = store.load_recent(10).await.unwrap();
    assert_eq!(all.len(), 2);

    // Both transactions store the non-negative magnitude...
    assert!(all.iter().all(|t| t.totals.total.cents() == 848));

    // ...and the ledger sum nets to zero via signed_total.
    let net: i64 = all.iter().map(|t| t.signed_total().cents()).sum();
    assert_eq!(net, 0);
}

#[tokio::test]
async fn refunded_transaction_cannot_be_edited() {
    let store = MemoryStore::default();

    let mut cart = Cart::new();
    cart.add_item("soda", "BEV", Money::from_cents(250), 1).unwrap();
    let mut tx = cart.checkout(PaymentMethod::Card, false, RATE, &clock()).unwrap();

    tx.transition_to(TransactionStatus::Refunded).unwrap();
    store.save(&tx).await.unwrap();

    let loaded = store.load_by_id(&tx.id).await.unwrap().unwrap();
    let mut session = EditSession::new(loaded);
    assert!(session.begin_edit().is_err());
}
