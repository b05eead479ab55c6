//! Upstream storefront API: order/product wire model and REST client.
//!
//! The storefront is an external collaborator; this module is a thin typed
//! wrapper over its `orders` and `products/{id}` endpoints. The one piece of
//! policy that lives here is shape checking: an orders response that is not a
//! JSON array is a protocol violation, not a deserialization detail.

mod client;
mod rest;
mod types;

pub use client::{ShopClient, ShopError};
pub use rest::RestShopClient;
pub use types::{
    LineItem, MetaEntry, Order, PaymentStatus, Product, ShippingAddress, ASSET_META_KEY,
    DPI_META_KEY, PRINT_ID_META_KEY,
};
