//! Repository implementations.
//!
//! One repository per aggregate: the product catalog (read-mostly) and the
//! transaction history (the `TransactionStore` implementation).

pub mod product;
pub mod transaction;
