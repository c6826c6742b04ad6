//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the **heart** of Tally POS: the order totals engine and the
//! transaction mutation rules, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              Transport (UI / HTTP) - not in this repo               │
//! │                              │                                      │
//! │  ┌───────────────────────────▼───────────────────────────────────┐  │
//! │  │               ★ tally-core (THIS CRATE) ★                     │  │
//! │  │                                                               │  │
//! │  │  ┌────────┐ ┌──────────┐ ┌─────┐ ┌────────┐ ┌─────────────┐  │  │
//! │  │  │ money  │ │ discount │ │ tax │ │ totals │ │ cart / edit │  │  │
//! │  │  │ Money  │ │ evaluate │ │     │ │ engine │ │  sessions   │  │  │
//! │  │  │ Exact  │ │          │ │     │ │        │ │             │  │  │
//! │  │  └────────┘ └──────────┘ └─────┘ └────────┘ └─────────────┘  │  │
//! │  │                                                               │  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • DETERMINISTIC            │  │
//! │  └───────────────────────────┬───────────────────────────────────┘  │
//! │                              │ TransactionStore trait                │
//! │  ┌───────────────────────────▼───────────────────────────────────┐  │
//! │  │                tally-store (SQLite, sqlx)                     │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent `Money` plus sub-cent `Exact` intermediates
//! - [`types`] - Domain types (LineItem, Discount, Totals, Transaction, ...)
//! - [`discount`] - Discount evaluator (applicability + amount)
//! - [`tax`] - Flat-rate tax calculator, gated by a toggle
//! - [`totals`] - The order totals engine; the only totals computation site
//! - [`cart`] - Ephemeral pre-checkout cart and checkout
//! - [`edit`] - Edit-session state machine over persisted transactions
//! - [`store`] - `TransactionStore` persistence trait
//! - [`clock`] - Injectable time source
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Mutation-boundary input validation
//!
//! ## Design Principles
//!
//! 1. **One engine**: every caller that needs totals invokes
//!    [`totals::compute_totals`]; divergent per-call-site rounding is the bug
//!    class this crate exists to eliminate
//! 2. **Integer money**: all monetary values are cents (i64); intermediates
//!    carry sub-cent precision and round half-up exactly once
//! 3. **Fail fast**: validation rejects at the mutation boundary with no
//!    partial state change
//! 4. **Injected collaborators**: the store, the clock and the tax rate are
//!    passed in; nothing here reads the environment or the system clock

pub mod cart;
pub mod clock;
pub mod discount;
pub mod edit;
pub mod error;
pub mod money;
pub mod store;
pub mod tax;
pub mod totals;
pub mod types;
pub mod validation;

pub use cart::Cart;
pub use clock::{Clock, FixedClock, SystemClock};
pub use edit::EditSession;
pub use error::{CoreError, CoreResult, PersistenceError, ValidationError};
pub use money::{Exact, Money};
pub use store::TransactionStore;
pub use totals::compute_totals;
pub use types::*;

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable; can be
/// made configurable later.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against fat-finger entry (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
