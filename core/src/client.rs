//! Request builder, response parser and local state for the orders API.
//!
//! # Design
//! Each remote operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`; the
//! unprefixed method (`get_config`, `create_order`, ...) runs both around a
//! `Transport`. Parsing that changes local state (loaded products, the active
//! order id) takes `&mut self`, so a client is never mutated concurrently.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::price;
use crate::store::{ActiveOrderStore, FileStore, MemoryStore};
use crate::types::{
    Config, CreateOrder, CreatedOrder, LineItem, Order, OrderItem, PayOrder, Payment, Product,
    ProductList, Shipping,
};

/// Placeholder order total returned by `order_total`.
pub const ORDER_TOTAL: i64 = 100;

/// Client for the payments backend's orders API.
#[derive(Debug)]
pub struct OrderClient<S = MemoryStore> {
    base_url: String,
    store: S,
    products: HashMap<String, Product>,
    line_items: Vec<LineItem>,
}

impl OrderClient<MemoryStore> {
    /// Client that keeps the active order id in memory only.
    pub fn in_memory(base_url: &str) -> Self {
        Self::new(base_url, MemoryStore::new())
    }
}

impl OrderClient<FileStore> {
    /// Client whose active order id survives restarts in `config.state_path`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, FileStore::new(&config.state_path))
    }
}

impl<S: ActiveOrderStore> OrderClient<S> {
    pub fn new(base_url: &str, store: S) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            products: HashMap::new(),
            line_items: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -- local state ------------------------------------------------------

    /// Order total used by the checkout page. Always `ORDER_TOTAL`; real
    /// totals are computed by the backend when the order is created.
    pub fn order_total(&self) -> i64 {
        ORDER_TOTAL
    }

    pub fn add_line_item(&mut self, sku: impl Into<String>, quantity: u32) {
        self.line_items.push(LineItem {
            sku: sku.into(),
            quantity,
        });
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn clear_line_items(&mut self) {
        self.line_items.clear();
    }

    /// Line items in the shape the orders API expects, in insertion order.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.line_items.iter().map(OrderItem::from).collect()
    }

    /// Payload for `create_order` built from the current line items.
    pub fn order_payload(
        &self,
        currency: &str,
        email: &str,
        shipping: Option<Shipping>,
        metadata: Map<String, Value>,
    ) -> CreateOrder {
        CreateOrder {
            currency: currency.to_string(),
            items: self.order_items(),
            email: email.to_string(),
            shipping,
            metadata,
        }
    }

    pub fn products(&self) -> &HashMap<String, Product> {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn format_price(&self, amount: i64, currency: &str) -> Result<String, ApiError> {
        price::format_price(amount, currency)
    }

    pub fn active_order_id(&self) -> Result<Option<String>, ApiError> {
        Ok(self.store.get()?)
    }

    pub fn set_active_order_id(&self, order_id: &str) -> Result<(), ApiError> {
        self.store.set(order_id)?;
        info!(order_id, "active order updated");
        Ok(())
    }

    // -- request builders -------------------------------------------------

    pub fn build_get_config(&self) -> HttpRequest {
        self.get(format!("{}/config", self.base_url))
    }

    pub fn build_load_products(&self) -> HttpRequest {
        self.get(format!("{}/products", self.base_url))
    }

    pub fn build_create_order(&self, input: &CreateOrder) -> Result<HttpRequest, ApiError> {
        self.post_json(format!("{}/orders", self.base_url), input)
    }

    pub fn build_pay_order(&self, order_id: &str, input: &PayOrder) -> Result<HttpRequest, ApiError> {
        let id = urlencoding::encode(order_id);
        self.post_json(format!("{}/orders/{id}/pay", self.base_url), input)
    }

    pub fn build_get_order_status(&self, order_id: &str) -> HttpRequest {
        let id = urlencoding::encode(order_id);
        self.get(format!("{}/orders/{id}", self.base_url))
    }

    // -- response parsers -------------------------------------------------

    pub fn parse_get_config(&self, response: HttpResponse) -> Result<Config, ApiError> {
        let config: Config = decode(&response)?;
        debug!(live = config.is_live_mode(), "loaded config");
        Ok(config)
    }

    /// Merge the returned catalogue into the products map. Returns how many
    /// products the response carried.
    pub fn parse_load_products(&mut self, response: HttpResponse) -> Result<usize, ApiError> {
        let list: ProductList = decode(&response)?;
        let count = list.data.len();
        for product in list.data {
            self.products.insert(product.id.clone(), product);
        }
        info!(count, total = self.products.len(), "loaded products");
        Ok(count)
    }

    /// Parse a created order and remember it as the active order. Nothing is
    /// persisted when the backend reports an error.
    pub fn parse_create_order(&mut self, response: HttpResponse) -> Result<Order, ApiError> {
        let CreatedOrder { order } = decode(&response)?;
        self.set_active_order_id(&order.id)?;
        Ok(order)
    }

    pub fn parse_pay_order(&self, response: HttpResponse) -> Result<Payment, ApiError> {
        decode(&response)
    }

    pub fn parse_get_order_status(&self, response: HttpResponse) -> Result<Order, ApiError> {
        decode(&response)
    }

    // -- round trips ------------------------------------------------------

    pub fn get_config<T: Transport>(&self, transport: &T) -> Result<Config, ApiError> {
        let response = transport.execute(self.build_get_config())?;
        self.parse_get_config(response)
    }

    pub fn load_products<T: Transport>(&mut self, transport: &T) -> Result<usize, ApiError> {
        let response = transport.execute(self.build_load_products())?;
        self.parse_load_products(response)
    }

    pub fn create_order<T: Transport>(
        &mut self,
        transport: &T,
        input: &CreateOrder,
    ) -> Result<Order, ApiError> {
        let response = transport.execute(self.build_create_order(input)?)?;
        self.parse_create_order(response)
    }

    pub fn pay_order<T: Transport>(
        &self,
        transport: &T,
        order_id: &str,
        input: &PayOrder,
    ) -> Result<Payment, ApiError> {
        let response = transport.execute(self.build_pay_order(order_id, input)?)?;
        self.parse_pay_order(response)
    }

    pub fn get_order_status<T: Transport>(&self, transport: &T, order_id: &str) -> Result<Order, ApiError> {
        let response = transport.execute(self.build_get_order_status(order_id))?;
        self.parse_get_order_status(response)
    }

    fn get(&self, path: String) -> HttpRequest {
        debug!(%path, "built GET request");
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn post_json<B: serde::Serialize>(&self, path: String, input: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        debug!(%path, bytes = body.len(), "built POST request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Decode a response body, surfacing the backend's `{error}` envelope first
/// and status codes second.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let value: Option<Value> = serde_json::from_str(&response.body).ok();

    if let Some(message) = value.as_ref().and_then(error_message) {
        warn!(status = response.status, %message, "backend returned an error");
        return Err(ApiError::Api {
            status: response.status,
            message,
        });
    }
    if !response.is_success() {
        if response.status == 404 {
            return Err(ApiError::NotFound);
        }
        return Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        });
    }

    match value {
        Some(value) => serde_json::from_value(value),
        None => serde_json::from_str(&response.body),
    }
    .map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// The message carried by a truthy `error` field, if any.
fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(match obj.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => Value::Object(obj.clone()).to_string(),
        }),
        other => Some(other.to_string()),
    }
}
