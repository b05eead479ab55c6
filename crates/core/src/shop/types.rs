use serde::{Deserialize, Serialize};

/// Metadata key carrying the customer's uploaded design URL on a line item.
pub const ASSET_META_KEY: &str = "design-file";
/// Metadata key carrying the cut template identifier on a product.
pub const PRINT_ID_META_KEY: &str = "print-id";
/// Metadata key carrying an optional DPI override on a product.
pub const DPI_META_KEY: &str = "dpi";

/// Payment status reported by the storefront.
///
/// Only `Processing` and `Completed` are in the paid set; everything the
/// storefront may invent beyond the known states collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    #[serde(other)]
    Other,
}

impl PaymentStatus {
    /// Whether an order in this status may be produced.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Processing | PaymentStatus::Completed)
    }
}

/// A key/value metadata entry as the storefront serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

fn meta_str<'a>(entries: &'a [MetaEntry], key: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|e| e.key == key)
        .and_then(|e| e.value.as_str())
}

/// Shipping address of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    /// Full recipient name, skipping empty parts.
    pub fn recipient_name(&self) -> String {
        let mut name = self.first_name.trim().to_string();
        let last = self.last_name.trim();
        if !last.is_empty() {
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str(last);
        }
        name
    }
}

/// One ordered item within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub product_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// The uploaded design reference, if the customer attached one.
    pub fn asset_url(&self) -> Option<&str> {
        meta_str(&self.meta_data, ASSET_META_KEY)
    }
}

/// An order as returned by the storefront.
///
/// Unknown fields are ignored; the storefront payload is much wider than
/// what the pipeline needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Line items that carry an asset reference, in order.
    pub fn asset_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|i| i.asset_url().is_some())
    }
}

/// Product record; the pipeline only reads its metadata mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
}

impl Product {
    /// The cut template identifier for this product.
    pub fn print_id(&self) -> Option<&str> {
        meta_str(&self.meta_data, PRINT_ID_META_KEY)
    }

    /// Optional DPI override for this product.
    pub fn dpi(&self) -> Option<u32> {
        self.meta_data
            .iter()
            .find(|e| e.key == DPI_META_KEY)
            .and_then(|e| match &e.value {
                serde_json::Value::Number(n) => n.as_u64().map(|v| v as u32),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ORDER: &str = r#"{
        "id": 727,
        "status": "processing",
        "currency": "EUR",
        "shipping": {
            "first_name": "Erika",
            "last_name": "Mustermann",
            "address_1": "Heidestrasse 17",
            "postcode": "51147",
            "city": "Koeln",
            "country": "DE"
        },
        "line_items": [
            {
                "id": 315,
                "name": "Drone skin",
                "product_id": 93,
                "quantity": 2,
                "meta_data": [
                    { "id": 1, "key": "design-file", "value": "https://cdn.example.com/d/315.png" }
                ]
            },
            {
                "id": 316,
                "product_id": 94,
                "quantity": 1
            }
        ]
    }"#;

    #[test]
    fn test_parse_order() {
        let order: Order = serde_json::from_str(SAMPLE_ORDER).unwrap();
        assert_eq!(order.id, 727);
        assert_eq!(order.status, PaymentStatus::Processing);
        assert_eq!(order.shipping.country, "DE");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(
            order.line_items[0].asset_url(),
            Some("https://cdn.example.com/d/315.png")
        );
        assert_eq!(order.line_items[1].asset_url(), None);
    }

    #[test]
    fn test_asset_items_filters_items_without_reference() {
        let order: Order = serde_json::from_str(SAMPLE_ORDER).unwrap();
        let ids: Vec<u64> = order.asset_items().map(|i| i.id).collect();
        assert_eq!(ids, vec![315]);
    }

    #[test]
    fn test_unknown_status_is_other() {
        let order: Order =
            serde_json::from_str(r#"{"id": 1, "status": "on-hold", "line_items": []}"#).unwrap();
        assert_eq!(order.status, PaymentStatus::Other);
        assert!(!order.status.is_paid());
    }

    #[test]
    fn test_paid_set() {
        assert!(!PaymentStatus::Pending.is_paid());
        assert!(PaymentStatus::Processing.is_paid());
        assert!(PaymentStatus::Completed.is_paid());
        assert!(!PaymentStatus::Other.is_paid());
    }

    #[test]
    fn test_recipient_name() {
        let shipping = ShippingAddress {
            first_name: "Erika".to_string(),
            last_name: "Mustermann".to_string(),
            ..Default::default()
        };
        assert_eq!(shipping.recipient_name(), "Erika Mustermann");

        let only_last = ShippingAddress {
            last_name: "Mustermann".to_string(),
            ..Default::default()
        };
        assert_eq!(only_last.recipient_name(), "Mustermann");
    }

    #[test]
    fn test_product_metadata_accessors() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": 93,
                "meta_data": [
                    { "key": "print-id", "value": "mavic-3" },
                    { "key": "dpi", "value": "300" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(product.print_id(), Some("mavic-3"));
        assert_eq!(product.dpi(), Some(300));
    }

    #[test]
    fn test_product_numeric_dpi() {
        let product: Product = serde_json::from_str(
            r#"{"id": 93, "meta_data": [{ "key": "dpi", "value": 150 }]}"#,
        )
        .unwrap();
        assert_eq!(product.dpi(), Some(150));
        assert_eq!(product.print_id(), None);
    }
}
