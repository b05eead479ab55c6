//! Testing utilities and mock implementations for E2E tests.
//!
//! Mock implementations of the pipeline's external seams (storefront, asset
//! transfer, composition), allowing full lifecycle testing without a real
//! shop, CDN or print toolchain.
//!
//! # Example
//!
//! ```rust,ignore
//! use skinpress_core::testing::{fixtures, MockShopClient};
//!
//! let shop = MockShopClient::new();
//! shop.set_orders(vec![fixtures::paid_order(727)]).await;
//! shop.set_product(fixtures::product(93, Some("mavic-3"), None)).await;
//! ```

mod mock_acquirer;
mod mock_composer;
mod mock_shop;

pub use mock_acquirer::MockAcquirer;
pub use mock_composer::MockComposer;
pub use mock_shop::MockShopClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::shop::{
        LineItem, MetaEntry, Order, PaymentStatus, Product, ShippingAddress, ASSET_META_KEY,
        DPI_META_KEY, PRINT_ID_META_KEY,
    };

    /// A typical recipient address.
    pub fn shipping_address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Erika".to_string(),
            last_name: "Mustermann".to_string(),
            address_1: "Heidestrasse 17".to_string(),
            postcode: "51147".to_string(),
            city: "Koeln".to_string(),
            country: "DE".to_string(),
        }
    }

    /// A line item carrying a design asset.
    pub fn line_item(id: u64, product_id: u64, asset_url: &str) -> LineItem {
        LineItem {
            id,
            product_id,
            quantity: 1,
            meta_data: vec![MetaEntry {
                key: ASSET_META_KEY.to_string(),
                value: json!(asset_url),
            }],
        }
    }

    /// A line item with no printable asset.
    pub fn plain_line_item(id: u64, product_id: u64) -> LineItem {
        LineItem {
            id,
            product_id,
            quantity: 1,
            meta_data: vec![],
        }
    }

    /// An order with the given status and items.
    pub fn order(id: u64, status: PaymentStatus, line_items: Vec<LineItem>) -> Order {
        Order {
            id,
            status,
            shipping: shipping_address(),
            line_items,
        }
    }

    /// A paid order with one printable item referencing `https://assets.test/{id}.png`.
    pub fn paid_order(id: u64) -> Order {
        order(
            id,
            PaymentStatus::Processing,
            vec![line_item(id * 10, 93, &format!("https://assets.test/{id}.png"))],
        )
    }

    /// A product with optional print id and dpi metadata.
    pub fn product(id: u64, print_id: Option<&str>, dpi: Option<u32>) -> Product {
        let mut meta_data = Vec::new();
        if let Some(print_id) = print_id {
            meta_data.push(MetaEntry {
                key: PRINT_ID_META_KEY.to_string(),
                value: json!(print_id),
            });
        }
        if let Some(dpi) = dpi {
            meta_data.push(MetaEntry {
                key: DPI_META_KEY.to_string(),
                value: json!(dpi),
            });
        }
        Product { id, meta_data }
    }
}
