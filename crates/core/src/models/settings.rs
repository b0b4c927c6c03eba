use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Tunables for the client core.
///
/// Every field has a serde default, so a settings file only needs the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Index of the first coins-list entry kept in the catalog.
    #[serde(default = "default_catalog_offset")]
    pub catalog_offset: usize,

    /// Number of coins kept in the catalog after duplicate suppression.
    #[serde(default = "default_catalog_window")]
    pub catalog_window: usize,

    /// Maximum number of pinned coins.
    #[serde(default = "default_pin_capacity")]
    pub pin_capacity: usize,

    /// Durable-store key holding the pinned ids.
    #[serde(default = "default_pin_storage_key")]
    pub pin_storage_key: String,

    /// Lifetime of a cached "more info" record.
    #[serde(default = "default_detail_ttl_ms")]
    pub detail_ttl_ms: u64,

    /// Delay between two live-report ticks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Currency of the live chart.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    #[serde(default = "default_coin_list_url")]
    pub coin_list_url: String,

    /// Base URL; the coin id is appended as a path segment.
    #[serde(default = "default_coin_detail_url")]
    pub coin_detail_url: String,

    #[serde(default = "default_price_url")]
    pub price_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_catalog_offset() -> usize {
    750
}

fn default_catalog_window() -> usize {
    100
}

fn default_pin_capacity() -> usize {
    5
}

fn default_pin_storage_key() -> String {
    "Checked IDs".to_string()
}

fn default_detail_ttl_ms() -> u64 {
    120_000
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_quote_currency() -> String {
    "USD".to_string()
}

fn default_coin_list_url() -> String {
    "https://api.coingecko.com/api/v3/coins/list".to_string()
}

fn default_coin_detail_url() -> String {
    "https://api.coingecko.com/api/v3/coins".to_string()
}

fn default_price_url() -> String {
    "https://min-api.cryptocompare.com/data/pricemulti".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_offset: default_catalog_offset(),
            catalog_window: default_catalog_window(),
            pin_capacity: default_pin_capacity(),
            pin_storage_key: default_pin_storage_key(),
            detail_ttl_ms: default_detail_ttl_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            quote_currency: default_quote_currency(),
            coin_list_url: default_coin_list_url(),
            coin_detail_url: default_coin_detail_url(),
            price_url: default_price_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::Configuration(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file on disk.
    pub fn load_from_file(path: &str) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that would make the core misbehave.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.catalog_window == 0 {
            return Err(CoreError::Configuration("catalog_window must be at least 1".into()));
        }
        if self.pin_capacity == 0 {
            return Err(CoreError::Configuration("pin_capacity must be at least 1".into()));
        }
        if self.pin_storage_key.trim().is_empty() {
            return Err(CoreError::Configuration("pin_storage_key must not be empty".into()));
        }
        if self.detail_ttl_ms == 0 {
            return Err(CoreError::Configuration("detail_ttl_ms must be positive".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Configuration("poll_interval_ms must be positive".into()));
        }
        if self.quote_currency.trim().is_empty() {
            return Err(CoreError::Configuration("quote_currency must not be empty".into()));
        }
        Ok(())
    }

    pub fn detail_ttl(&self) -> Duration {
        Duration::from_millis(self.detail_ttl_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
