//! # Transaction Mutation Rules
//!
//! State machine governing after-the-fact edits to a persisted transaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Viewing ──begin_edit──► Editing ──save──► (await store) ──► Viewing│
//! │     ▲                      │  ▲                  │                  │
//! │     └─────cancel_edit──────┘  └──── failure ─────┘                  │
//! │                                (draft retained, retry is caller's)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are a derived view: the draft never caches a `Totals` that could
//! go stale against its items, discount or tax toggle. Rendering calls
//! [`EditSession::preview_totals`]; `save` recomputes through the same
//! engine and persists the result.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::store::TransactionStore;
use crate::totals::compute_totals;
use crate::types::{Discount, LineItem, PaymentMethod, TaxRate, Totals, Transaction};
use crate::validation::validate_quantity;

/// The editable fields of a transaction, snapshotted by `begin_edit`.
#[derive(Debug, Clone)]
struct Draft {
    items: Vec<LineItem>,
    discount: Option<Discount>,
    tax_enabled: bool,
    payment_method: PaymentMethod,
    is_return: bool,
}

/// An edit session over one persisted transaction.
///
/// Holds the committed transaction plus, while editing, an in-memory draft.
/// Mutations apply strictly in call order; there is no parallelism inside a
/// session, and concurrent sessions on the same transaction are arbitrated
/// by the store's revision check at save time.
#[derive(Debug)]
pub struct EditSession {
    committed: Transaction,
    draft: Option<Draft>,
}

impl EditSession {
    /// Opens a session in the Viewing state.
    pub fn new(transaction: Transaction) -> Self {
        EditSession {
            committed: transaction,
            draft: None,
        }
    }

    /// The last committed (persisted) transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.committed
    }

    /// True while a draft exists.
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Snapshots the transaction as an editable draft. No recomputation
    /// happens yet. Terminal-state transactions (cancelled, refunded) are
    /// locked against editing.
    pub fn begin_edit(&mut self) -> CoreResult<()> {
        if self.committed.status.is_terminal() {
            return Err(CoreError::TransactionLocked {
                id: self.committed.id.clone(),
                status: self.committed.status,
            });
        }
        if self.draft.is_some() {
            return Err(CoreError::EditInProgress {
                id: self.committed.id.clone(),
            });
        }

        self.draft = Some(Draft {
            items: self.committed.items.clone(),
            discount: self.committed.discount.clone(),
            tax_enabled: self.committed.totals.tax_applied,
            payment_method: self.committed.payment_method,
            is_return: self.committed.is_return,
        });
        Ok(())
    }

    /// Sets a line's quantity. A quantity of zero or less removes the line
    /// entirely, equivalent to [`EditSession::remove_item`].
    pub fn set_item_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let id = self.committed.id.clone();
        let draft = self.draft_mut()?;
        validate_quantity(quantity).map_err(|source| CoreError::InvalidLineItem {
            product_id: product_id.to_string(),
            source,
        })?;

        match draft.items.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound {
                id,
                product_id: product_id.to_string(),
            }),
        }
    }

    /// Removes a line from the draft. Removing the last line leaves an
    /// empty draft; `save` will reject it rather than persist a transaction
    /// with no items.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let id = self.committed.id.clone();
        let draft = self.draft_mut()?;

        let before = draft.items.len();
        draft.items.retain(|l| l.product_id != product_id);
        if draft.items.len() == before {
            return Err(CoreError::LineNotFound {
                id,
                product_id: product_id.to_string(),
            });
        }
        Ok(())
    }

    /// Replaces the draft discount. Applicability is NOT checked here: an
    /// out-of-window discount is retained and simply contributes zero when
    /// totals are computed.
    pub fn apply_discount(&mut self, discount: Discount) -> CoreResult<()> {
        self.draft_mut()?.discount = Some(discount);
        Ok(())
    }

    /// Clears the draft discount.
    pub fn remove_discount(&mut self) -> CoreResult<Option<Discount>> {
        Ok(self.draft_mut()?.discount.take())
    }

    /// Flips the draft's tax toggle.
    pub fn toggle_tax(&mut self) -> CoreResult<()> {
        let draft = self.draft_mut()?;
        draft.tax_enabled = !draft.tax_enabled;
        Ok(())
    }

    /// Changes the recorded tender.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.draft_mut()?.payment_method = method;
        Ok(())
    }

    /// Flips or sets the return flag.
    pub fn set_return_flag(&mut self, is_return: bool) -> CoreResult<()> {
        self.draft_mut()?.is_return = is_return;
        Ok(())
    }

    /// Recomputes totals for the current draft, for rendering. Derived on
    /// demand every time; never cached.
    pub fn preview_totals(
        &self,
        tax_rate: TaxRate,
        clock: &impl Clock,
    ) -> CoreResult<Totals> {
        let draft = self.draft.as_ref().ok_or_else(|| CoreError::NoActiveEdit {
            id: self.committed.id.clone(),
        })?;
        Ok(compute_totals(
            &draft.items,
            draft.discount.as_ref(),
            draft.tax_enabled,
            tax_rate,
            clock.now(),
        ))
    }

    /// Recomputes totals from the full draft, bumps the revision and
    /// persists through `store`.
    ///
    /// Validation failures (empty draft) block the save with no transition.
    /// A store failure is surfaced to the caller and the session REMAINS in
    /// Editing with the draft intact: no data loss, retry is the caller's
    /// call. On success the session returns to Viewing with the new totals.
    pub async fn save(
        &mut self,
        store: &impl TransactionStore,
        tax_rate: TaxRate,
        clock: &impl Clock,
    ) -> CoreResult<&Transaction> {
        let draft = self.draft.as_ref().ok_or_else(|| CoreError::NoActiveEdit {
            id: self.committed.id.clone(),
        })?;

        if draft.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let totals = compute_totals(
            &draft.items,
            draft.discount.as_ref(),
            draft.tax_enabled,
            tax_rate,
            clock.now(),
        );

        let updated = Transaction {
            id: self.committed.id.clone(),
            items: draft.items.clone(),
            discount: draft.discount.clone(),
            totals,
            timestamp: self.committed.timestamp,
            payment_method: draft.payment_method,
            is_return: draft.is_return,
            status: self.committed.status,
            revision: self.committed.revision + 1,
        };

        store.save(&updated).await?;

        self.committed = updated;
        self.draft = None;
        Ok(&self.committed)
    }

    /// Discards the draft and returns to Viewing with the committed
    /// transaction unchanged. A no-op when nothing is being edited.
    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    fn draft_mut(&mut self) -> CoreResult<&mut Draft> {
        let id = &self.committed.id;
        match self.draft.as_mut() {
            Some(draft) => Ok(draft),
            None => Err(CoreError::NoActiveEdit { id: id.clone() }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::clock::FixedClock;
    use crate::error::PersistenceError;
    use crate::money::Money;
    use crate::types::TransactionStatus;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;

    const RATE: TaxRate = TaxRate::from_bps(1300);

    fn clock() -> FixedClock {
        FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    /// In-memory store fake: records saves, optionally fails.
    #[derive(Default)]
    struct FakeStore {
        saved: RefCell<Vec<Transaction>>,
        fail_next: RefCell<bool>,
    }

    impl TransactionStore for FakeStore {
        async fn save(&self, transaction: &Transaction) -> Result<(), PersistenceError> {
            if *self.fail_next.borrow() {
                *self.fail_next.borrow_mut() = false;
                return Err(PersistenceError::Backend {
                    id: transaction.id.clone(),
                    operation: "save".to_string(),
                    message: "disk full".to_string(),
                });
            }
            self.saved.borrow_mut().push(transaction.clone());
            Ok(())
        }

        async fn load_recent(&self, _limit: u32) -> Result<Vec<Transaction>, PersistenceError> {
            Ok(self.saved.borrow().clone())
        }

        async fn load_by_id(&self, id: &str) -> Result<Option<Transaction>, PersistenceError> {
            Ok(self.saved.borrow().iter().rev().find(|t| t.id == id).cloned())
        }
    }

    fn discounted_transaction() -> Transaction {
        let mut cart = Cart::new();
        cart.add_item("p-1", "GEN", Money::from_cents(1000), 1).unwrap();
        cart.apply_discount(Discount::percentage(2000, "20%").unwrap());
        cart.checkout(PaymentMethod::Cash, false, RATE, &clock()).unwrap()
    }

    #[test]
    fn test_mutations_require_active_edit() {
        let mut session = EditSession::new(discounted_transaction());

        assert!(matches!(
            session.set_item_quantity("p-1", 2),
            Err(CoreError::NoActiveEdit { .. })
        ));
        assert!(matches!(
            session.toggle_tax(),
            Err(CoreError::NoActiveEdit { .. })
        ));
        assert!(matches!(
            session.preview_totals(RATE, &clock()),
            Err(CoreError::NoActiveEdit { .. })
        ));
    }

    #[test]
    fn test_begin_edit_twice_fails() {
        let mut session = EditSession::new(discounted_transaction());
        session.begin_edit().unwrap();
        assert!(matches!(
            session.begin_edit(),
            Err(CoreError::EditInProgress { .. })
        ));
    }

    #[test]
    fn test_terminal_state_locks_editing() {
        let mut tx = discounted_transaction();
        tx.transition_to(TransactionStatus::Refunded).unwrap();

        let mut session = EditSession::new(tx);
        assert!(matches!(
            session.begin_edit(),
            Err(CoreError::TransactionLocked { .. })
        ));
    }

    #[test]
    fn test_partial_refund_remains_editable() {
        let mut tx = discounted_transaction();
        tx.transition_to(TransactionStatus::PartialRefund).unwrap();

        let mut session = EditSession::new(tx);
        assert!(session.begin_edit().is_ok());
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut session = EditSession::new(discounted_transaction());
        session.begin_edit().unwrap();
        session.set_item_quantity("p-1", 0).unwrap();

        // Draft is now empty; previewing shows zero totals
        let totals = session.preview_totals(RATE, &clock()).unwrap();
        assert_eq!(totals.subtotal.cents(), 0);
    }

    #[tokio::test]
    async fn test_save_rejects_empty_draft() {
        let mut session = EditSession::new(discounted_transaction());
        session.begin_edit().unwrap();
        session.remove_item("p-1").unwrap();

        let store = FakeStore::default();
        let err = session.save(&store, RATE, &clock()).await;
        assert!(matches!(err, Err(CoreError::EmptyCart)));

        // No transition: still editing, nothing persisted
        assert!(session.is_editing());
        assert!(store.saved.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_remove_discount_then_save_recomputes_fully() {
        // Start from the 20%-discounted $10.00 transaction (total $9.04);
        // after removing the discount the totals must match an undiscounted
        // sale of the same items: $10.00 + 13% = $11.30.
        let mut session = EditSession::new(discounted_transaction());
        assert_eq!(session.transaction().totals.total.cents(), 904);

        session.begin_edit().unwrap();
        session.remove_discount().unwrap();

        let store = FakeStore::default();
        let saved = session.save(&store, RATE, &clock()).await.unwrap();

        assert_eq!(saved.totals.subtotal.cents(), 1000);
        assert_eq!(saved.totals.discount_amount.cents(), 0);
        assert_eq!(saved.totals.tax.cents(), 130);
        assert_eq!(saved.totals.total.cents(), 1130);
        assert!(saved.discount.is_none());
        assert_eq!(saved.revision, 1);
        assert!(!session.is_editing());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_draft_for_retry() {
        let mut session = EditSession::new(discounted_transaction());
        session.begin_edit().unwrap();
        session.set_item_quantity("p-1", 3).unwrap();

        let store = FakeStore::default();
        *store.fail_next.borrow_mut() = true;

        let err = session.save(&store, RATE, &clock()).await;
        assert!(matches!(
            err,
            Err(CoreError::Persistence(PersistenceError::Backend { .. }))
        ));

        // Draft retained with prior edits; committed unchanged
        assert!(session.is_editing());
        assert_eq!(session.transaction().revision, 0);
        assert_eq!(
            session.preview_totals(RATE, &clock()).unwrap().subtotal.cents(),
            3000
        );

        // Retry succeeds and commits the same edits
        let saved = session.save(&store, RATE, &clock()).await.unwrap();
        assert_eq!(saved.totals.subtotal.cents(), 3000);
        assert_eq!(saved.revision, 1);
    }

    #[tokio::test]
    async fn test_cancel_edit_discards_draft() {
        let mut session = EditSession::new(discounted_transaction());
        session.begin_edit().unwrap();
        session.remove_discount().unwrap();
        session.toggle_tax().unwrap();

        session.cancel_edit();

        assert!(!session.is_editing());
        assert_eq!(session.transaction().totals.total.cents(), 904);
        assert!(session.transaction().discount.is_some());
    }

    #[tokio::test]
    async fn test_payment_method_change_survives_save() {
        let mut session = EditSession::new(discounted_transaction());
        assert_eq!(session.transaction().payment_method, PaymentMethod::Cash);

        session.begin_edit().unwrap();
        session.set_payment_method(PaymentMethod::Card).unwrap();

        let store = FakeStore::default();
        let saved = session.save(&store, RATE, &clock()).await.unwrap();

        assert_eq!(saved.payment_method, PaymentMethod::Card);
        // Tender changes leave the money fields alone
        assert_eq!(saved.totals.total.cents(), 904);
        assert_eq!(store.saved.borrow()[0].payment_method, PaymentMethod::Card);
    }

    #[tokio::test]
    async fn test_return_flag_changes_signed_total_only() {
        let mut session = EditSession::new(discounted_transaction());
        session.begin_edit().unwrap();
        session.set_return_flag(true).unwrap();

        let store = FakeStore::default();
        let saved = session.save(&store, RATE, &clock()).await.unwrap();

        assert_eq!(saved.totals.total.cents(), 904);
        assert_eq!(saved.signed_total().cents(), -904);
    }
}
