use serde::{Deserialize, Serialize};

/// Orchestrator tuning knobs.
///
/// Intervals and delays are in milliseconds so tests can shrink them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How often to poll the storefront for orders.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Production attempts per order before recording a permanent failure.
    #[serde(default = "default_order_retry_limit")]
    pub order_retry_limit: u32,

    /// Backoff between production attempts for one order.
    #[serde(default = "default_order_retry_backoff_ms")]
    pub order_retry_backoff_ms: u64,

    /// Attempts to fetch the order list within one cycle.
    #[serde(default = "default_api_retry_limit")]
    pub api_retry_limit: u32,

    /// Delay between order list attempts.
    #[serde(default = "default_api_retry_delay_ms")]
    pub api_retry_delay_ms: u64,

    /// Print resolution used when the product carries no dpi override.
    #[serde(default = "default_target_dpi")]
    pub target_dpi: u32,
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_order_retry_limit() -> u32 {
    3
}

fn default_order_retry_backoff_ms() -> u64 {
    5000
}

fn default_api_retry_limit() -> u32 {
    3
}

fn default_api_retry_delay_ms() -> u64 {
    2000
}

fn default_target_dpi() -> u32 {
    150
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            order_retry_limit: default_order_retry_limit(),
            order_retry_backoff_ms: default_order_retry_backoff_ms(),
            api_retry_limit: default_api_retry_limit(),
            api_retry_delay_ms: default_api_retry_delay_ms(),
            target_dpi: default_target_dpi(),
        }
    }
}
