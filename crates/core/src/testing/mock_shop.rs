//! Mock shop client for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::shop::{Order, Product, ShopClient, ShopError};

/// Mock implementation of the ShopClient trait.
///
/// Provides controllable behavior for testing:
/// - A standing order list returned by every call
/// - A queue of scripted responses consumed before the standing list,
///   for exercising retry paths
/// - Product records by id
/// - Call counters for assertions
pub struct MockShopClient {
    orders: Arc<RwLock<Vec<Order>>>,
    scripted_responses: Arc<RwLock<VecDeque<Result<Vec<Order>, ShopError>>>>,
    products: Arc<RwLock<HashMap<u64, Product>>>,
    list_calls: Arc<RwLock<usize>>,
    product_calls: Arc<RwLock<usize>>,
}

impl Default for MockShopClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockShopClient {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(RwLock::new(Vec::new())),
            scripted_responses: Arc::new(RwLock::new(VecDeque::new())),
            products: Arc::new(RwLock::new(HashMap::new())),
            list_calls: Arc::new(RwLock::new(0)),
            product_calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the standing order list.
    pub async fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.write().await = orders;
    }

    /// Queue a one-shot response, consumed before the standing list.
    pub async fn push_response(&self, response: Result<Vec<Order>, ShopError>) {
        self.scripted_responses.write().await.push_back(response);
    }

    /// Register a product record.
    pub async fn set_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// Number of list_orders calls made.
    pub async fn list_order_calls(&self) -> usize {
        *self.list_calls.read().await
    }

    /// Number of get_product calls made.
    pub async fn get_product_calls(&self) -> usize {
        *self.product_calls.read().await
    }
}

#[async_trait]
impl ShopClient for MockShopClient {
    async fn list_orders(&self) -> Result<Vec<Order>, ShopError> {
        *self.list_calls.write().await += 1;

        if let Some(response) = self.scripted_responses.write().await.pop_front() {
            return response;
        }

        Ok(self.orders.read().await.clone())
    }

    async fn get_product(&self, product_id: u64) -> Result<Product, ShopError> {
        *self.product_calls.write().await += 1;

        self.products
            .read()
            .await
            .get(&product_id)
            .cloned()
            .ok_or_else(|| ShopError::Api(format!("HTTP 404: no product {}", product_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_standing_orders() {
        let shop = MockShopClient::new();
        shop.set_orders(vec![fixtures::paid_order(1)]).await;

        let orders = shop.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(shop.list_order_calls().await, 1);
    }

    #[tokio::test]
    async fn test_scripted_responses_consumed_first() {
        let shop = MockShopClient::new();
        shop.set_orders(vec![fixtures::paid_order(1)]).await;
        shop.push_response(Err(ShopError::Timeout)).await;

        assert!(shop.list_orders().await.is_err());
        assert_eq!(shop.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_is_api_error() {
        let shop = MockShopClient::new();
        let err = shop.get_product(404).await.unwrap_err();
        assert!(matches!(err, ShopError::Api(_)));
    }
}
