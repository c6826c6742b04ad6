//! # tally-store: SQLite Persistence for Tally POS
//!
//! This crate owns everything that touches the database: the connection
//! pool, embedded migrations, the product catalog, and the durable
//! transaction log behind the core's `TransactionStore` trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                tally-core (pure logic)                  │
//! │                          │                              │
//! │                TransactionStore trait                   │
//! │                          │                              │
//! │  ┌───────────────────────▼───────────────────────────┐  │
//! │  │           ★ tally-store (THIS CRATE) ★            │  │
//! │  │                                                   │  │
//! │  │  ┌──────┐ ┌────────────┐ ┌─────────────────────┐  │  │
//! │  │  │ pool │ │ migrations │ │ repository::        │  │  │
//! │  │  │      │ │ (embedded) │ │  product            │  │  │
//! │  │  │      │ │            │ │  transaction        │  │  │
//! │  │  └──────┘ └────────────┘ └─────────────────────┘  │  │
//! │  │                                                   │  │
//! │  │              SQLite (WAL mode, sqlx)              │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//!
//! - All money columns store integer cents; conversion to [`tally_core::Money`]
//!   happens only at the row boundary
//! - Enum columns store the serde snake_case form, enforced by CHECK
//!   constraints in the schema
//! - Saves are revision-guarded: an UPDATE that matches zero rows means a
//!   concurrent edit won, and surfaces as `PersistenceError::Conflict`

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use config::PosConfig;
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::product::{CatalogProduct, CatalogRepository};
pub use repository::transaction::TransactionRepository;
