//! Client core for a payments backend's orders API.
//!
//! # Overview
//! Fetches the backend's config and product catalogue, turns locally held
//! line items into an order payload, creates and pays orders, and remembers
//! the most recently created order id in an `ActiveOrderStore`.
//!
//! # Design
//! - Host-does-IO: `OrderClient::build_*` produces `HttpRequest` values and
//!   `OrderClient::parse_*` consumes `HttpResponse` values. The round-trip
//!   helpers (`get_config`, `create_order`, ...) run both through any
//!   `Transport`; `UreqTransport` is the blocking network implementation.
//! - One error contract: every fallible call returns `ApiError`, including a
//!   backend `{error}` body, so callers never inspect response objects for an
//!   error field themselves.
//! - Presentation is left to the caller: `Config::is_live_mode` reports what a
//!   UI needs to decide whether to show its demo notice.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod price;
pub mod store;
#[cfg(feature = "http")]
pub mod transport;
pub mod types;

pub use client::{OrderClient, ORDER_TOTAL};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorBody, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use price::format_price;
pub use store::{ActiveOrderStore, FileStore, MemoryStore, ACTIVE_ORDER_KEY};
#[cfg(feature = "http")]
pub use transport::UreqTransport;
pub use types::{
    Address, Config, CreateOrder, ItemKind, LineItem, Order, OrderItem, PayOrder, Payment,
    PaymentSource, Product, Shipping,
};
