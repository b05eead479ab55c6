//! Fulfillment orchestrator: the polling loop that drives orders from the
//! storefront through acquisition, composition and hotfolder delivery, with
//! the ledger deciding what still needs doing.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::FulfillmentOrchestrator;
pub use types::{AttemptError, AttemptReport, CycleSummary, OrchestratorError};
