//! Configuration for a geotable index.
//!
//! Settings can be built fluently, parsed from JSON (or TOML with the `toml`
//! feature), read from a file, or taken from `GEOTABLE_*` environment
//! variables.

use crate::error::{GeoError, Result};
use serde::de::Error;
use std::path::Path;
use std::time::Duration;

/// Environment variable names read by [`Config::from_env`].
pub mod env {
    pub const TABLE_NAME: &str = "GEOTABLE_TABLE_NAME";
    pub const PRECISION_BITS: &str = "GEOTABLE_PRECISION_BITS";
    pub const PARTITION_BITS: &str = "GEOTABLE_PARTITION_BITS";
    pub const MAX_RANGES: &str = "GEOTABLE_MAX_RANGES";
    pub const MAX_CONCURRENT_SCANS: &str = "GEOTABLE_MAX_CONCURRENT_SCANS";
    pub const QUERY_TIMEOUT_MS: &str = "GEOTABLE_QUERY_TIMEOUT_MS";
}

/// Largest supported hash width (31 bits per axis).
pub const MAX_PRECISION_BITS: u8 = 62;

/// Index configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Backend table holding the geo rows
    #[serde(default = "Config::default_table_name")]
    pub table_name: String,

    /// Total interleaved bits in a hash value (half per axis)
    #[serde(default = "Config::default_precision_bits")]
    pub precision_bits: u8,

    /// Leading hash bits used as the partition key; 0 keeps one partition
    #[serde(default)]
    pub partition_bits: u8,

    /// Cap on quad-tree cells emitted by the range coverer
    #[serde(default = "Config::default_max_ranges")]
    pub max_ranges: usize,

    /// Backend requests allowed in flight for one call: range scans of a
    /// query, or row writes of a `put_points` batch
    #[serde(default = "Config::default_max_concurrent_scans")]
    pub max_concurrent_scans: usize,

    /// Deadline for the whole fan-out of a query, in milliseconds
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
}

impl Config {
    fn default_table_name() -> String {
        "geo_records".to_string()
    }

    const fn default_precision_bits() -> u8 {
        54
    }

    const fn default_max_ranges() -> usize {
        32
    }

    const fn default_max_concurrent_scans() -> usize {
        8
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_precision_bits(mut self, bits: u8) -> Self {
        self.precision_bits = bits;
        self
    }

    pub fn with_partition_bits(mut self, bits: u8) -> Self {
        self.partition_bits = bits;
        self
    }

    pub fn with_max_ranges(mut self, max_ranges: usize) -> Self {
        self.max_ranges = max_ranges;
        self
    }

    pub fn with_max_concurrent_scans(mut self, scans: usize) -> Self {
        self.max_concurrent_scans = scans;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.table_name.trim().is_empty() {
            return Err("Table name must not be empty".to_string());
        }

        if self.precision_bits < 2
            || self.precision_bits > MAX_PRECISION_BITS
            || self.precision_bits % 2 != 0
        {
            return Err(format!(
                "Precision bits must be an even number in [2, {}], got {}",
                MAX_PRECISION_BITS, self.precision_bits
            ));
        }

        if self.partition_bits > self.precision_bits {
            return Err(format!(
                "Partition bits ({}) must not exceed precision bits ({})",
                self.partition_bits, self.precision_bits
            ));
        }

        if self.max_ranges == 0 {
            return Err("Max ranges must be greater than zero".to_string());
        }

        if self.max_concurrent_scans == 0 {
            return Err("Max concurrent scans must be greater than zero".to_string());
        }

        if self.query_timeout_ms == Some(0) {
            return Err("Query timeout must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a config file. `.toml` files need the `toml` feature; anything
    /// else is parsed as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        #[cfg(feature = "toml")]
        if path.extension().is_some_and(|ext| ext == "toml") {
            return Config::from_toml(&contents).map_err(|e| {
                GeoError::InvalidInput(format!("Invalid config {}: {}", path.display(), e))
            });
        }

        Config::from_json(&contents).map_err(|e| {
            GeoError::InvalidInput(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    /// Read overrides from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`] but with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(table_name) = lookup(env::TABLE_NAME) {
            config.table_name = table_name;
        }
        if let Some(bits) = parse_var(&lookup, env::PRECISION_BITS)? {
            config.precision_bits = bits;
        }
        if let Some(bits) = parse_var(&lookup, env::PARTITION_BITS)? {
            config.partition_bits = bits;
        }
        if let Some(max_ranges) = parse_var(&lookup, env::MAX_RANGES)? {
            config.max_ranges = max_ranges;
        }
        if let Some(scans) = parse_var(&lookup, env::MAX_CONCURRENT_SCANS)? {
            config.max_concurrent_scans = scans;
        }
        if let Some(timeout) = parse_var(&lookup, env::QUERY_TIMEOUT_MS)? {
            config.query_timeout_ms = Some(timeout);
        }

        config.validate().map_err(GeoError::InvalidInput)?;
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            GeoError::InvalidInput(format!("{} has invalid value {:?}: {}", key, raw, e))
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: Self::default_table_name(),
            precision_bits: Self::default_precision_bits(),
            partition_bits: 0,
            max_ranges: Self::default_max_ranges(),
            max_concurrent_scans: Self::default_max_concurrent_scans(),
            query_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.table_name, "geo_records");
        assert_eq!(config.precision_bits, 54);
        assert_eq!(config.partition_bits, 0);
        assert_eq!(config.max_ranges, 32);
        assert!(config.query_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_table_name("posts")
            .with_partition_bits(6)
            .with_query_timeout(Duration::from_millis(250));

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
        assert_eq!(deserialized.query_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_config_json_defaults_and_unknown_fields() {
        let config = Config::from_json(r#"{"table_name": "t"}"#).unwrap();
        assert_eq!(config.precision_bits, 54);

        assert!(Config::from_json(r#"{"tabel_name": "t"}"#).is_err());
        assert!(Config::from_json(r#"{"precision_bits": 7}"#).is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().with_precision_bits(64).validate().is_err());
        assert!(Config::default().with_precision_bits(0).validate().is_err());
        assert!(
            Config::default()
                .with_precision_bits(10)
                .with_partition_bits(12)
                .validate()
                .is_err()
        );
        assert!(Config::default().with_max_ranges(0).validate().is_err());
        assert!(Config::default().with_max_concurrent_scans(0).validate().is_err());
        assert!(Config::default().with_table_name(" ").validate().is_err());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (env::TABLE_NAME, "image_metadata"),
            (env::PRECISION_BITS, "40"),
            (env::PARTITION_BITS, " 4 "),
            (env::QUERY_TIMEOUT_MS, "1500"),
        ]
        .into();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.table_name, "image_metadata");
        assert_eq!(config.precision_bits, 40);
        assert_eq!(config.partition_bits, 4);
        assert_eq!(config.max_ranges, 32);
        assert_eq!(config.query_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_config_from_lookup_rejects_garbage() {
        let err = Config::from_lookup(|key| {
            (key == env::MAX_RANGES).then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.is_invalid_input());

        let err = Config::from_lookup(|key| {
            (key == env::PRECISION_BITS).then(|| "63".to_string())
        })
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(&mut file, br#"{"table_name": "from_file", "max_ranges": 8}"#)
            .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.table_name, "from_file");
        assert_eq!(config.max_ranges, 8);

        assert!(matches!(
            Config::from_file("/definitely/not/here.json"),
            Err(GeoError::Io(_))
        ));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default().with_partition_bits(8);
        let toml_str = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&toml_str).unwrap(), config);
    }
}
