//! REST storefront client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::ShopConfig;

use super::client::{ShopClient, ShopError};
use super::types::{Order, Product};

/// Storefront REST client authenticating with consumer key/secret query
/// credentials (WooCommerce style).
pub struct RestShopClient {
    client: Client,
    config: ShopConfig,
}

impl RestShopClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ShopConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, ShopError> {
        let url = self.endpoint(path);
        debug!(url = %url, "Requesting shop endpoint");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("consumer_key", self.config.consumer_key.as_str()),
                ("consumer_secret", self.config.consumer_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ShopError::Timeout
                } else if e.is_connect() {
                    ShopError::ConnectionFailed(e.to_string())
                } else {
                    ShopError::Api(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ShopError::Api(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ShopError::Api(format!("Failed to parse response: {}", e)))
    }

    /// Decode an orders response, enforcing the list shape.
    pub(crate) fn orders_from_value(value: serde_json::Value) -> Result<Vec<Order>, ShopError> {
        if !value.is_array() {
            return Err(ShopError::Protocol(format!(
                "orders endpoint did not return a list: {}",
                value.to_string().chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| ShopError::Protocol(format!("malformed order record: {}", e)))
    }
}

#[async_trait]
impl ShopClient for RestShopClient {
    async fn list_orders(&self) -> Result<Vec<Order>, ShopError> {
        let value = self.get_json("orders").await?;
        let orders = Self::orders_from_value(value)?;
        debug!(count = orders.len(), "Fetched order list");
        Ok(orders)
    }

    async fn get_product(&self, product_id: u64) -> Result<Product, ShopError> {
        let value = self.get_json(&format!("products/{}", product_id)).await?;
        serde_json::from_value(value)
            .map_err(|e| ShopError::Protocol(format!("malformed product record: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_orders_from_value_accepts_list() {
        let value = json!([
            {"id": 1, "status": "processing", "line_items": []},
            {"id": 2, "status": "pending", "line_items": []}
        ]);
        let orders = RestShopClient::orders_from_value(value).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, 1);
    }

    #[test]
    fn test_orders_from_value_rejects_object() {
        let value = json!({"code": "error", "message": "invalid"});
        let err = RestShopClient::orders_from_value(value).unwrap_err();
        assert!(matches!(err, ShopError::Protocol(_)));
        assert!(err.to_string().contains("did not return a list"));
    }

    #[test]
    fn test_orders_from_value_rejects_malformed_record() {
        // A list, but the record is missing its id.
        let value = json!([{"status": "processing"}]);
        let err = RestShopClient::orders_from_value(value).unwrap_err();
        assert!(matches!(err, ShopError::Protocol(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = RestShopClient::new(ShopConfig {
            base_url: "https://shop.example.com/wp-json/wc/v3/".to_string(),
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            timeout_secs: 5,
        });
        assert_eq!(
            client.endpoint("orders"),
            "https://shop.example.com/wp-json/wc/v3/orders"
        );
        assert_eq!(
            client.endpoint("products/93"),
            "https://shop.example.com/wp-json/wc/v3/products/93"
        );
    }
}
