//! Error types for the order client.
//!
//! # Design
//! Every fallible operation returns `ApiError`. A response body carrying an
//! `error` field always becomes `Api`, whatever its status code, because the
//! payments backend reports declines and validation failures that way. Only
//! bodies without an `error` field fall through to `NotFound` / `Http`.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by the active order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a JSON object.
    #[error("store contents are corrupt: {0}")]
    Corrupt(String),

    /// A lock guarding the in-memory slot was poisoned.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors returned by `OrderClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be executed (connection refused, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The backend answered with a body carrying an `error` field.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The server returned 404 without an error body.
    #[error("resource not found")]
    NotFound,

    /// The server returned some other non-2xx status without an error body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Reading or writing the active order id failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// `format_price` was given something that is not an ISO 4217 code.
    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),
}

/// The `{error: message}` envelope the payments backend speaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Render the error in the backend's `{error: message}` shape, for hosts
    /// that surface errors as plain result objects.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}
