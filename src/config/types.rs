use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::duration_from_str;
use crate::error::{ConfigError, ValidationError};

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub endpoint: Option<String>,
    pub users: Option<usize>,
    pub duration: Option<u64>,
    pub ttl: Option<DurationValue>,
    pub window: Option<DurationValue>,
    pub warmup: Option<DurationValue>,
    pub hot_keys: Option<Vec<String>>,
    pub hot_ratio: Option<f64>,
    pub tail_size: Option<usize>,
    pub pages: Option<u64>,
    pub think_min_ms: Option<u64>,
    pub think_max_ms: Option<u64>,
    pub slow_ms: Option<u64>,
    pub status: Option<u16>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub no_color: Option<bool>,
    /// Explicit query weight table; when present it replaces the hot/tail
    /// mix entirely.
    pub queries: Option<BTreeMap<String, u64>>,
}

/// A duration given either as bare seconds or as a unit-suffixed string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// Convert to a `Duration`, naming `field` in any error.
    ///
    /// # Errors
    ///
    /// Returns an error for zero durations and unparseable strings.
    pub fn to_duration(&self, field: &str) -> Result<Duration, ConfigError> {
        let result = match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => duration_from_str(text),
        };
        result.map_err(|err| ConfigError::InvalidDuration {
            field: field.to_owned(),
            source: err,
        })
    }
}
