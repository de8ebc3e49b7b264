//! `inkwell.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use inkwell_carrier::CarrierConfig;
use inkwell_commerce::prelude::*;
use inkwell_observability::{LogFormat, LoggingConfig};
use inkwell_server::ServerConfig;
use serde::{Deserialize, Serialize};

/// File names searched for, in order, when `--config` is not given.
pub const CONFIG_NAMES: [&str; 3] = ["inkwell.toml", ".inkwell.toml", "inkwell.json"];

/// Prefix of environment overrides, e.g. `INKWELL_SERVER_PORT=8080`.
pub const ENV_PREFIX: &str = "INKWELL_";

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InkwellConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub carrier: CarrierConfig,

    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the document database snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Snapshot file. Relative paths resolve against the working directory.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inkwell-data.json"),
        }
    }
}

impl InkwellConfig {
    /// Load config from a file, TOML unless the extension says JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `INKWELL_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        let vars = std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX));
        self.apply_overrides(vars)
    }

    /// Apply `INKWELL_SECTION_FIELD=value` pairs. Unknown names are ignored.
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let lower = rest.to_lowercase();
            let Some((section, field)) = lower.split_once('_') else {
                continue;
            };
            let key = format!("{section}.{field}");
            if self.get(&key).is_ok() {
                self.set(&key, &value)
                    .with_context(|| format!("Invalid value in {name}"))?;
            }
        }
        Ok(())
    }

    /// Read one value by dot-separated key.
    pub fn get(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["server", "host"] => self.server.host.clone(),
            ["server", "port"] => self.server.port.to_string(),
            ["server", "cors_origins"] => self.server.cors_origins.join(","),
            ["database", "path"] => self.database.path.display().to_string(),
            ["carrier", "api_url"] => self.carrier.api_url.clone(),
            ["carrier", "api_key"] => self.carrier.api_key.clone().unwrap_or_default(),
            ["carrier", "timeout_secs"] => self.carrier.timeout_secs.to_string(),
            ["carrier", "limit"] => self.carrier.limit.to_string(),
            ["carrier", "min_query_len"] => self.carrier.min_query_len.to_string(),
            ["shop", "currency"] => self.shop.currency.code().to_string(),
            ["shop", "self_pickup_delivery_id"] => self
                .shop
                .self_pickup_delivery_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            ["shop", "discount_precedence"] => self.shop.discount_precedence.as_str().to_string(),
            ["shop", "max_count_per_line"] => self.shop.max_count_per_line.to_string(),
            ["shop", "recently_viewed_limit"] => self.shop.recently_viewed_limit.to_string(),
            ["logging", "level"] => self.logging.level.clone(),
            ["logging", "format"] => match self.logging.format {
                LogFormat::Json => "json".to_string(),
                LogFormat::Human => "human".to_string(),
            },
            ["logging", "access_log"] => self.logging.access_log.to_string(),
            _ => bail!("Unknown config key: {}", key),
        };
        Ok(value)
    }

    /// Set one value by dot-separated key. Empty strings clear optional values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = value.parse()?,
            ["server", "cors_origins"] => {
                self.server.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            }
            ["database", "path"] => self.database.path = PathBuf::from(value),
            ["carrier", "api_url"] => self.carrier.api_url = value.to_string(),
            ["carrier", "api_key"] => self.carrier.api_key = non_empty(value),
            ["carrier", "timeout_secs"] => self.carrier.timeout_secs = value.parse()?,
            ["carrier", "limit"] => self.carrier.limit = value.parse()?,
            ["carrier", "min_query_len"] => self.carrier.min_query_len = value.parse()?,
            ["shop", "currency"] => {
                self.shop.currency = Currency::from_code(value)
                    .with_context(|| format!("Unknown currency: {value}"))?
            }
            ["shop", "self_pickup_delivery_id"] => {
                self.shop.self_pickup_delivery_id = non_empty(value).map(DeliveryId::new)
            }
            ["shop", "discount_precedence"] => {
                self.shop.discount_precedence = DiscountPrecedence::from_str(value)
                    .with_context(|| format!("Unknown discount precedence: {value}"))?
            }
            ["shop", "max_count_per_line"] => self.shop.max_count_per_line = value.parse()?,
            ["shop", "recently_viewed_limit"] => self.shop.recently_viewed_limit = value.parse()?,
            ["logging", "level"] => self.logging.level = value.to_string(),
            ["logging", "format"] => {
                self.logging.format = match value {
                    "json" => LogFormat::Json,
                    "human" => LogFormat::Human,
                    other => bail!("Unknown log format: {other}"),
                }
            }
            ["logging", "access_log"] => self.logging.access_log = value.parse()?,
            _ => bail!("Unknown or read-only config key: {}", key),
        }

        Ok(())
    }

    /// Problems that would stop `inkwell serve` or make it misbehave.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.server.addr().is_err() {
            errors.push(format!(
                "server.host '{}' is not a valid listen address",
                self.server.host
            ));
        }
        if self.shop.max_count_per_line < 1 {
            errors.push("shop.max_count_per_line must be at least 1".to_string());
        }
        if self.carrier.limit == 0 {
            errors.push("carrier.limit must be at least 1".to_string());
        }
        if self.carrier.api_key.is_none() {
            warnings.push("carrier.api_key is not set; address lookups will be unavailable".into());
        }
        if self.shop.self_pickup_delivery_id.is_none() {
            warnings.push("shop.self_pickup_delivery_id is not set".to_string());
        }

        (errors, warnings)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Find a config file in `start` or one of its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Generate a commented default `inkwell.toml`.
pub fn generate_default_config() -> String {
    r#"# Inkwell bookstore configuration

[server]
host = "127.0.0.1"
port = 3000
# Empty allows any origin.
cors_origins = []

[database]
path = "inkwell-data.json"

[carrier]
api_url = "https://api.novaposhta.ua/v2.0/json/"
# api_key = "your-nova-poshta-key"
timeout_secs = 10
limit = 20
min_query_len = 3

[shop]
currency = "UAH"
# self_pickup_delivery_id = ""
# group_on_base_price | stacked | best_of
discount_precedence = "group_on_base_price"
max_count_per_line = 99
recently_viewed_limit = 10

[logging]
level = "info"
# json | human
format = "human"
access_log = true
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: InkwellConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, InkwellConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: InkwellConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [shop]
            discount_precedence = "best_of"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.shop.discount_precedence, DiscountPrecedence::BestOf);
        assert_eq!(config.carrier.min_query_len, 3);
    }

    #[test]
    fn test_get_and_set() {
        let mut config = InkwellConfig::default();
        config.set("server.port", "4000").unwrap();
        config.set("carrier.api_key", "secret").unwrap();
        config.set("shop.currency", "USD").unwrap();
        config.set("server.cors_origins", "http://a.test, http://b.test").unwrap();

        assert_eq!(config.get("server.port").unwrap(), "4000");
        assert_eq!(config.get("carrier.api_key").unwrap(), "secret");
        assert_eq!(config.get("shop.currency").unwrap(), "USD");
        assert_eq!(config.server.cors_origins.len(), 2);

        config.set("carrier.api_key", "").unwrap();
        assert!(config.carrier.api_key.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = InkwellConfig::default();
        assert!(config.set("server.port", "many").is_err());
        assert!(config.set("shop.currency", "XYZ").is_err());
        assert!(config.set("logging.format", "xml").is_err());
        assert!(config.set("nope.nothing", "1").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = InkwellConfig::default();
        config
            .apply_overrides(vec![
                ("INKWELL_SERVER_PORT".to_string(), "9090".to_string()),
                ("INKWELL_CARRIER_API_KEY".to_string(), "k".to_string()),
                ("INKWELL_DATABASE_PATH".to_string(), "/tmp/x.json".to_string()),
                ("INKWELL_UNKNOWN_THING".to_string(), "ignored".to_string()),
                ("OTHER_SERVER_PORT".to_string(), "1".to_string()),
            ])
            .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.carrier.api_key.as_deref(), Some("k"));
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.json"));

        let bad = config.apply_overrides(vec![(
            "INKWELL_SERVER_PORT".to_string(),
            "port".to_string(),
        )]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_validate() {
        let config = InkwellConfig::default();
        let (errors, warnings) = config.validate();
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 2);

        let mut broken = InkwellConfig::default();
        broken.server.host = "not a host".to_string();
        broken.shop.max_count_per_line = 0;
        let (errors, _) = broken.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_save_and_load_json() {
        let path = std::env::temp_dir().join(format!("inkwell-config-{}.json", std::process::id()));
        let mut config = InkwellConfig::default();
        config.server.port = 3111;
        config.save(&path).unwrap();

        let loaded = InkwellConfig::load(&path).unwrap();
        assert_eq!(loaded.server.port, 3111);
        std::fs::remove_file(&path).ok();
    }
}
