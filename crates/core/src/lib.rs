pub mod acquirer;
pub mod composer;
pub mod config;
pub mod hotfolder;
pub mod ledger;
pub mod orchestrator;
pub mod shop;
pub mod testing;

pub use acquirer::{AcquireError, AcquirerConfig, AssetAcquirer, HttpAcquirer};
pub use composer::{
    ComposeError, ComposeRequest, ComposedDocument, Composer, CutTemplates, LabelSettings,
    PrintComposer,
};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use hotfolder::{Hotfolder, HotfolderError};
pub use ledger::{Ledger, LedgerError, LedgerRecord, Outcome, SqliteLedger};
pub use orchestrator::{
    AttemptError, AttemptReport, CycleSummary, FulfillmentOrchestrator, OrchestratorConfig,
    OrchestratorError,
};
pub use shop::{
    LineItem, Order, PaymentStatus, Product, RestShopClient, ShippingAddress, ShopClient,
    ShopError,
};
