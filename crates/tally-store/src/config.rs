//! # Application Configuration
//!
//! Environment-driven settings for the store layer, including the single
//! canonical tax rate consumed by every totals computation. The core never
//! reads the environment; it receives the rate as a parameter, which is what
//! keeps per-call-site rate drift impossible.

use std::env;
use std::path::PathBuf;

use tally_core::types::TaxRate;
use tally_core::validation::validate_tax_rate_bps;

use crate::error::{StoreError, StoreResult};

/// Default tax rate when TALLY_TAX_RATE_BPS is unset: 13%.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1300;

/// Deployment configuration for a register.
#[derive(Debug, Clone)]
pub struct PosConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// The canonical flat tax rate for this deployment.
    pub tax_rate: TaxRate,
}

impl PosConfig {
    /// Reads configuration from the environment.
    ///
    /// - `TALLY_DB_PATH` (required): SQLite file location
    /// - `TALLY_TAX_RATE_BPS` (optional, default 1300): flat tax rate in
    ///   basis points, validated to 0..=10000
    pub fn from_env() -> StoreResult<Self> {
        let database_path = env::var("TALLY_DB_PATH")
            .map(PathBuf::from)
            .map_err(|_| StoreError::Configuration("TALLY_DB_PATH not set".to_string()))?;

        let bps: u32 = match env::var("TALLY_TAX_RATE_BPS") {
            Ok(raw) => raw.parse().map_err(|_| {
                StoreError::Configuration(format!("invalid TALLY_TAX_RATE_BPS: {raw}"))
            })?,
            Err(_) => DEFAULT_TAX_RATE_BPS,
        };
        validate_tax_rate_bps(bps)
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        Ok(PosConfig {
            database_path,
            tax_rate: TaxRate::from_bps(bps),
        })
    }

    /// Configuration for a throwaway in-memory database (tests, demos).
    pub fn in_memory() -> Self {
        PosConfig {
            database_path: PathBuf::from(":memory:"),
            tax_rate: TaxRate::from_bps(DEFAULT_TAX_RATE_BPS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_defaults() {
        let config = PosConfig::in_memory();
        assert_eq!(config.tax_rate.bps(), 1300);
    }
}
