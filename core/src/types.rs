//! DTOs for the payments backend.
//!
//! # Design
//! Records owned by the backend (`Product`, `Order`, `Config`, `Payment`)
//! name the fields the client reads and keep everything else in a flattened
//! `extra` map, so an order handed back to the caller is the full object the
//! backend sent. Types are defined independently from the mock-server crate;
//! the live round-trip test catches schema drift.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client configuration published by the backend at `GET /config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "stripePublishableKey")]
    pub publishable_key: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// A live publishable key means real payments; UIs hide their demo notice.
    pub fn is_live_mode(&self) -> bool {
        self.publishable_key.contains("live")
    }
}

/// A product from the backend catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit price in minor currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /products` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProductList {
    pub data: Vec<Product>,
}

/// A line the shopper wants to buy, kept locally until the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Sku,
}

/// An order line in the shape the orders API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// The sku this line refers to.
    pub parent: String,
    pub quantity: u32,
}

impl From<&LineItem> for OrderItem {
    fn from(item: &LineItem) -> Self {
        Self {
            kind: ItemKind::Sku,
            parent: item.sku.clone(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: Address,
}

/// Request payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub currency: String,
    pub items: Vec<OrderItem>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// An order as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /orders` success envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedOrder {
    pub order: Order,
}

/// A payment source (card token, wallet source, ...) minted by the payment
/// provider's browser SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSource {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentSource {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

/// Request payload for `POST /orders/{id}/pay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayOrder {
    pub source: PaymentSource,
}

/// `POST /orders/{id}/pay` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PaymentSource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn live_mode_follows_publishable_key() {
        let live: Config = serde_json::from_value(json!({"stripePublishableKey": "pk_live_x"})).unwrap();
        let test: Config = serde_json::from_value(json!({"stripePublishableKey": "pk_test_x"})).unwrap();
        assert!(live.is_live_mode());
        assert!(!test.is_live_mode());
    }

    #[test]
    fn config_keeps_unknown_fields() {
        let config: Config = serde_json::from_value(json!({
            "stripePublishableKey": "pk_test_x",
            "stripeCountry": "US",
        }))
        .unwrap();
        assert_eq!(config.extra["stripeCountry"], "US");
    }

    #[test]
    fn order_item_serializes_type_tag() {
        let item = OrderItem::from(&LineItem {
            sku: "sku_1".to_string(),
            quantity: 3,
        });
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"type": "sku", "parent": "sku_1", "quantity": 3})
        );
    }

    #[test]
    fn order_round_trips_unknown_fields() {
        let raw = json!({
            "id": "or_1",
            "status": "created",
            "amount": 1500,
            "currency": "usd",
            "email": "jenny@example.com",
            "items": [{"type": "sku", "parent": "sku_1", "quantity": 1}],
        });
        let order: Order = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(order.id, "or_1");
        assert_eq!(order.status.as_deref(), Some("created"));
        assert_eq!(serde_json::to_value(&order).unwrap(), raw);
    }

    #[test]
    fn create_order_omits_missing_shipping() {
        let payload = CreateOrder {
            currency: "usd".to_string(),
            items: Vec::new(),
            email: "jenny@example.com".to_string(),
            shipping: None,
            metadata: Map::new(),
        };
        let body = serde_json::to_value(&payload).unwrap();
        assert!(body.get("shipping").is_none());
        assert_eq!(body["metadata"], json!({}));
    }

    #[test]
    fn product_requires_id() {
        let result: Result<Product, _> = serde_json::from_value(json!({"name": "Pin"}));
        assert!(result.is_err());
    }
}
