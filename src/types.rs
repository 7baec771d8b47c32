//! Shared record types
//!
//! Records appended to the JSON stores. Field names match the on-disk
//! format, so existing `daily-data.json` and `metrics.json` files stay readable.

use serde::{Deserialize, Serialize};

/// Placeholder stored when a snapshot could not be obtained
pub const UNAVAILABLE: &str = "Unavailable";

/// One day's external snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// RFC 3339 timestamp of the run
    pub timestamp: String,
    /// `current_weather` object, or the sentinel string
    pub weather: serde_json::Value,
    /// Full price map, or the sentinel string
    pub crypto: serde_json::Value,
}

impl DailyEntry {
    /// Whether the weather field holds real data
    pub fn has_weather(&self) -> bool {
        !is_sentinel(&self.weather)
    }

    /// Whether the crypto field holds real data
    pub fn has_crypto(&self) -> bool {
        !is_sentinel(&self.crypto)
    }
}

/// A synthetic experiment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentEntry {
    pub date: String,
    pub experiment_id: String,
    /// Decimal string, 4 places
    pub accuracy: String,
    /// Decimal string, 4 places
    pub loss: String,
    pub notes: String,
}

/// The sentinel as a JSON value
pub fn sentinel() -> serde_json::Value {
    serde_json::Value::String(UNAVAILABLE.to_string())
}

/// Check whether a stored field is the sentinel
pub fn is_sentinel(value: &serde_json::Value) -> bool {
    value.as_str() == Some(UNAVAILABLE)
}
