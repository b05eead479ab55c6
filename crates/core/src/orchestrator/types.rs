//! Types for the fulfillment orchestrator.

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::shop::ShopError;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The order list could not be fetched within the retry budget.
    #[error("order listing failed after {attempts} attempts: {last_error}")]
    OrderListing { attempts: u32, last_error: String },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("shop error: {0}")]
    Shop(#[from] ShopError),
}

/// How one production attempt for an order failed.
///
/// The distinction drives the retry loop: retryable failures get another
/// attempt within the budget, permanent failures are recorded immediately.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("retryable: {0}")]
    Retryable(String),

    #[error("permanent: {0}")]
    Permanent(String),
}

/// Result of a successful production attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// Documents delivered to the hotfolder. Zero means the order carried no
    /// printable items and was completed as a no-op.
    pub items_produced: usize,
}

/// What happened in one polling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Orders in the fetched list.
    pub orders_listed: usize,
    /// Orders produced and recorded as success this cycle.
    pub produced: usize,
    /// Orders recorded as permanent failure this cycle.
    pub failed: usize,
    /// Orders skipped because they are not paid yet.
    pub skipped_unpaid: usize,
    /// Orders skipped because the ledger already has a record.
    pub skipped_recorded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::OrderListing {
            attempts: 3,
            last_error: "shop request timed out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "order listing failed after 3 attempts: shop request timed out"
        );

        let err = AttemptError::Permanent("no cut template".to_string());
        assert_eq!(err.to_string(), "permanent: no cut template");
    }

    #[test]
    fn test_cycle_summary_default() {
        let summary = CycleSummary::default();
        assert_eq!(summary.orders_listed, 0);
        assert_eq!(summary.produced, 0);
    }
}
