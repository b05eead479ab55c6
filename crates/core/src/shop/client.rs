use async_trait::async_trait;
use thiserror::Error;

use super::types::{Order, Product};

/// Errors from the storefront API.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("shop request timed out")]
    Timeout,

    #[error("shop connection failed: {0}")]
    ConnectionFailed(String),

    #[error("shop api error: {0}")]
    Api(String),

    /// The response decoded, but not into the shape the endpoint promises
    /// (e.g. an object where the orders list should be).
    #[error("shop protocol violation: {0}")]
    Protocol(String),
}

/// Trait over the storefront's order/product endpoints.
#[async_trait]
pub trait ShopClient: Send + Sync {
    /// Fetch the current order list.
    async fn list_orders(&self) -> Result<Vec<Order>, ShopError>;

    /// Fetch one product record (for its metadata mapping).
    async fn get_product(&self, product_id: u64) -> Result<Product, ShopError>;
}
