//! Durable record of which orders have already been handled.
//!
//! The ledger is the idempotency gate of the pipeline: before an order is
//! attempted the orchestrator consults it, and after a terminal outcome the
//! orchestrator records it. A `success` record is never overwritten.

mod sqlite;
mod store;

pub use sqlite::SqliteLedger;
pub use store::{Ledger, LedgerError, LedgerRecord, Outcome};
