//! Client configuration from environment variables.
//!
//! | Variable                  | Default                          |
//! |---------------------------|----------------------------------|
//! | `ORDER_API_BASE_URL`      | `https://crypdeep.herokuapp.com` |
//! | `ORDER_STATE_PATH`        | `.order-client.json`             |
//! | `ORDER_HTTP_TIMEOUT_SECS` | none (wait indefinitely)         |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://crypdeep.herokuapp.com";
pub const DEFAULT_STATE_PATH: &str = ".order-client.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// File backing the active order id.
    pub state_path: PathBuf,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("ORDER_API_BASE_URL") {
            config.set_base_url(&url)?;
        }
        if let Some(path) = get("ORDER_STATE_PATH") {
            config.state_path = PathBuf::from(path);
        }
        if let Some(secs) = get("ORDER_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::Invalid {
                name: "ORDER_HTTP_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: "ORDER_HTTP_TIMEOUT_SECS",
                    reason: "must be at least 1; unset it to wait indefinitely".to_string(),
                });
            }
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Replace the backend base URL. Only http(s) URLs are accepted; a
    /// trailing slash is dropped.
    pub fn set_base_url(&mut self, url: &str) -> Result<(), ConfigError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "ORDER_API_BASE_URL",
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(())
    }
}
