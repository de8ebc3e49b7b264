//! Carrier client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Nova Poshta JSON endpoint.
pub const DEFAULT_API_URL: &str = "https://api.novaposhta.ua/v2.0/json/";

/// Carrier lookup settings, the `[carrier]` section of `inkwell.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Maximum options returned per lookup.
    pub limit: usize,
    /// Settlement and street queries shorter than this are not sent.
    pub min_query_len: usize,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_secs: 10,
            limit: 20,
            min_query_len: 3,
        }
    }
}

impl CarrierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Whether `query` is long enough to be looked up. Counts characters, not bytes.
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_counts_characters() {
        let config = CarrierConfig::default();
        assert!(!config.accepts("Ky"));
        assert!(config.accepts("Київ"));
        assert!(!config.accepts("  Ки  "));
        assert!(config.clone().with_min_query_len(1).accepts("K"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CarrierConfig = serde_json::from_str(r#"{"api_key":"secret"}"#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.min_query_len, 3);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
