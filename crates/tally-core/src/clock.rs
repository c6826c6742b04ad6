//! # Clock
//!
//! Injectable time source. Discount validity checks and checkout timestamps
//! never call the system clock directly; they take a [`Clock`] (or a plain
//! `DateTime<Utc>`), which keeps the totals chain deterministic under test.

use chrono::{DateTime, Utc};

/// Supplies the current instant.
pub trait Clock {
    /// Returns "now".
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock. Use everywhere outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
