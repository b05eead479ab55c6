//! Ledger storage trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error.
    #[error("ledger database error: {0}")]
    Database(String),
}

/// Terminal outcome of processing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every qualifying line item was produced and delivered.
    Success,
    /// The retry budget was exhausted or a non-retryable failure occurred.
    PermanentFailure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::PermanentFailure => "permanent_failure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Outcome::Success),
            "permanent_failure" => Some(Outcome::PermanentFailure),
            _ => None,
        }
    }
}

/// One authoritative record per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub order_id: u64,
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
}

/// Trait for ledger storage backends.
///
/// Callers are sequential by design (one polling loop); implementations only
/// need interior mutability, not multi-writer coordination.
pub trait Ledger: Send + Sync {
    /// Look up the record for an order, if any.
    fn lookup(&self, order_id: u64) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Insert or update the record for an order.
    ///
    /// An existing `success` record is left untouched: once an order has been
    /// produced, no later write may shadow that fact.
    fn upsert(&self, order_id: u64, outcome: Outcome) -> Result<LedgerRecord, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_round_trip() {
        for outcome in [Outcome::Success, Outcome::PermanentFailure] {
            assert_eq!(Outcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(Outcome::parse("garbage"), None);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Database("disk full".to_string());
        assert_eq!(err.to_string(), "ledger database error: disk full");
    }
}
