//! Durable storage for the active order id.
//!
//! The client remembers exactly one thing between sessions: the id of the
//! most recently created order, kept under the `orderId` key. Writes are
//! last-writer-wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::StoreError;

/// Key the active order id is stored under.
pub const ACTIVE_ORDER_KEY: &str = "orderId";

/// Read/write access to the persisted active order id.
pub trait ActiveOrderStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn set(&self, order_id: &str) -> Result<(), StoreError>;
}

impl<T: ActiveOrderStore + ?Sized> ActiveOrderStore for Arc<T> {
    fn get(&self) -> Result<Option<String>, StoreError> {
        (**self).get()
    }

    fn set(&self, order_id: &str) -> Result<(), StoreError> {
        (**self).set(order_id)
    }
}

/// Process-local store. Forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActiveOrderStore for MemoryStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        let slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slot.clone())
    }

    fn set(&self, order_id: &str) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(order_id.to_string());
        Ok(())
    }
}

/// Store backed by a small JSON object file, e.g. `{"orderId": "or_123"}`.
///
/// A missing file reads as "no active order". Other keys in the file are left
/// alone on write, so the file can be shared with other local settings.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt("expected a JSON object".to_string())),
            Err(e) => Err(StoreError::Corrupt(e.to_string())),
        }
    }
}

impl ActiveOrderStore for FileStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        let map = self.read_map()?;
        match map.get(ACTIVE_ORDER_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(id)) => Ok(Some(id.clone())),
            Some(other) => Err(StoreError::Corrupt(format!(
                "{ACTIVE_ORDER_KEY} is not a string: {other}"
            ))),
        }
    }

    /// Corrupt contents are replaced rather than blocking the write. The new
    /// file is written beside the target and renamed over it, so readers see
    /// either the old contents or the new ones.
    fn set(&self, order_id: &str) -> Result<(), StoreError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StoreError::Corrupt(reason)) => {
                warn!(path = %self.path.display(), %reason, "discarding corrupt order state");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(ACTIVE_ORDER_KEY.to_string(), Value::String(order_id.to_string()));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, body)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_starts_empty() {
        assert_eq!(MemoryStore::new().get().unwrap(), None);
    }

    #[test]
    fn memory_store_last_write_wins() {
        let store = MemoryStore::new();
        store.set("or_1").unwrap();
        store.set("or_2").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("or_2"));
    }

    #[test]
    fn arc_store_shares_state() {
        let store = Arc::new(MemoryStore::new());
        let other = Arc::clone(&store);
        store.set("or_shared").unwrap();
        assert_eq!(other.get().unwrap().as_deref(), Some("or_shared"));
    }
}
