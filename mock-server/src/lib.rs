//! In-memory stand-in for the payments backend.
//!
//! Serves a fixed catalogue, creates orders priced from it, and "charges"
//! payment sources: the token `tok_chargeDeclined` is always declined, any
//! other source succeeds. Every error, including malformed request bodies,
//! uses the backend's `{error}` envelope.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Source id the mock treats as a declined card.
pub const DECLINED_SOURCE: &str = "tok_chargeDeclined";
pub const DEFAULT_PUBLISHABLE_KEY: &str = "pk_test_demo";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: String,
    pub parent: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub items: Vec<Item>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct CreateOrder {
    pub currency: String,
    pub items: Vec<Item>,
    pub email: String,
    pub shipping: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct PayOrder {
    pub source: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub publishable_key: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            publishable_key: DEFAULT_PUBLISHABLE_KEY.to_string(),
        }
    }
}

pub type Db = Arc<RwLock<HashMap<String, Order>>>;

#[derive(Clone)]
pub struct AppState {
    orders: Db,
    catalogue: Arc<Vec<Product>>,
    publishable_key: Arc<str>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody { error: message.into() }))
}

/// Unwrap a JSON body, reporting extractor failures in the `{error}` envelope.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, (StatusCode, Json<ErrorBody>)> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(rejection.status(), rejection.body_text()))
}

/// The products every mock backend starts with.
pub fn catalogue() -> Vec<Product> {
    [
        ("increment", "Increment Magazine", 399),
        ("shirt", "Stripe Shirt", 999),
        ("pins", "Stripe Pins", 799),
    ]
    .into_iter()
    .map(|(id, name, price)| Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        currency: "usd".to_string(),
    })
    .collect()
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        orders: Arc::new(RwLock::new(HashMap::new())),
        catalogue: Arc::new(catalogue()),
        publishable_key: config.publishable_key.into(),
    };
    Router::new()
        .route("/config", get(get_config))
        .route("/products", get(list_products))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/pay", post(pay_order))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, MockConfig::default()).await
}

pub async fn serve(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "stripePublishableKey": &*state.publishable_key,
        "stripeCountry": "US",
        "currency": "usd",
    }))
}

async fn list_products(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({ "data": &*state.catalogue }))
}

async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrder>, JsonRejection>,
) -> ApiResult<Value> {
    let input = json_body(payload)?;
    let currency = input.currency.to_ascii_lowercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(api_error(StatusCode::BAD_REQUEST, format!("invalid currency: {}", input.currency)));
    }
    if input.items.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "order has no items"));
    }

    let mut amount = 0;
    for item in &input.items {
        if item.kind != "sku" {
            return Err(api_error(StatusCode::BAD_REQUEST, format!("unsupported item type: {}", item.kind)));
        }
        if item.quantity == 0 {
            return Err(api_error(StatusCode::BAD_REQUEST, format!("quantity must be positive for {}", item.parent)));
        }
        let product = state
            .catalogue
            .iter()
            .find(|p| p.id == item.parent)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("no such sku: {}", item.parent)))?;
        if product.currency != currency {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("{} is not sold in {currency}", product.id),
            ));
        }
        amount += product.price * i64::from(item.quantity);
    }

    let order = Order {
        id: format!("or_{}", Uuid::new_v4().simple()),
        status: "created".to_string(),
        amount,
        currency,
        items: input.items,
        email: input.email,
        shipping: input.shipping,
        metadata: input.metadata,
    };
    info!(order_id = %order.id, amount, "order created");
    state.orders.write().await.insert(order.id.clone(), order.clone());
    Ok(Json(serde_json::json!({ "order": order })))
}

async fn get_order(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    let orders = state.orders.read().await;
    orders
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no such order: {id}")))
}

async fn pay_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PayOrder>, JsonRejection>,
) -> ApiResult<Value> {
    let input = json_body(payload)?;
    let source_id = input
        .source
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "source must carry an id"))?
        .to_string();

    let mut orders = state.orders.write().await;
    let order = orders
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no such order: {id}")))?;
    if order.status == "paid" {
        return Err(api_error(StatusCode::BAD_REQUEST, "order already paid"));
    }
    if source_id == DECLINED_SOURCE {
        info!(order_id = %id, "payment declined");
        return Err(api_error(StatusCode::PAYMENT_REQUIRED, "card_declined"));
    }

    order.status = "paid".to_string();
    info!(order_id = %id, source = %source_id, "order paid");
    Ok(Json(serde_json::json!({ "order": order, "source": input.source })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ids_are_unique() {
        let products = catalogue();
        let mut ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn item_serializes_type_tag() {
        let item = Item {
            kind: "sku".to_string(),
            parent: "pins".to_string(),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "sku");
        assert_eq!(json["parent"], "pins");
    }

    #[test]
    fn create_order_metadata_defaults_to_empty() {
        let input: CreateOrder = serde_json::from_str(
            r#"{"currency":"usd","items":[],"email":"a@b.c"}"#,
        )
        .unwrap();
        assert!(input.metadata.is_empty());
        assert!(input.shipping.is_none());
    }

    #[test]
    fn create_order_rejects_missing_email() {
        let result: Result<CreateOrder, _> = serde_json::from_str(r#"{"currency":"usd","items":[]}"#);
        assert!(result.is_err());
    }
}
