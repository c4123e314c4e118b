//! Table builder
//!
//! Collects configuration for a [`GeoTable`] and validates it once in
//! [`GeoTableBuilder::build`].

use crate::config::Config;
use crate::db::GeoTable;
use crate::error::Result;
use crate::storage::GeoBackend;
use std::sync::Arc;
use std::time::Duration;

/// Builder for a [`GeoTable`] over a shared backend.
#[derive(Debug)]
pub struct GeoTableBuilder<B> {
    backend: Arc<B>,
    config: Config,
}

impl<B: GeoBackend> GeoTableBuilder<B> {
    /// Start from the default configuration.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            config: Config::default(),
        }
    }

    /// Replace the whole configuration, e.g. one loaded with
    /// [`Config::from_env`] or [`Config::from_file`].
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.config = self.config.with_table_name(table_name);
        self
    }

    /// Hash length in bits. Must be even and match the data already stored.
    pub fn precision_bits(mut self, bits: u8) -> Self {
        self.config = self.config.with_precision_bits(bits);
        self
    }

    /// Leading hash bits used as the partition key.
    pub fn partition_bits(mut self, bits: u8) -> Self {
        self.config = self.config.with_partition_bits(bits);
        self
    }

    pub fn max_ranges(mut self, max_ranges: usize) -> Self {
        self.config = self.config.with_max_ranges(max_ranges);
        self
    }

    /// In-flight backend requests per query or batch write.
    pub fn max_concurrent_scans(mut self, scans: usize) -> Self {
        self.config = self.config.with_max_concurrent_scans(scans);
        self
    }

    /// Deadline for all range scans of one query.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_query_timeout(timeout);
        self
    }

    /// Validate the configuration and build the table handle.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidInput`](crate::GeoError::InvalidInput) if the
    /// configuration is inconsistent.
    pub fn build(self) -> Result<GeoTable<B>> {
        GeoTable::new(self.backend, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    #[test]
    fn test_builder_applies_settings() {
        let table = GeoTableBuilder::new(Arc::new(MemoryBackend::new()))
            .table_name("photos")
            .precision_bits(40)
            .partition_bits(6)
            .max_ranges(16)
            .max_concurrent_scans(4)
            .query_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let config = table.config();
        assert_eq!(table.table_name(), "photos");
        assert_eq!(config.precision_bits, 40);
        assert_eq!(config.partition_bits, 6);
        assert_eq!(config.max_ranges, 16);
        assert_eq!(config.max_concurrent_scans, 4);
        assert_eq!(config.query_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let backend = Arc::new(MemoryBackend::new());
        let odd = GeoTableBuilder::new(Arc::clone(&backend))
            .precision_bits(33)
            .build();
        assert!(odd.unwrap_err().is_invalid_input());

        let too_many_partitions = GeoTableBuilder::new(backend)
            .precision_bits(20)
            .partition_bits(22)
            .build();
        assert!(too_many_partitions.unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_builder_takes_loaded_config() {
        let config = Config::default().with_table_name("loaded").with_max_ranges(4);
        let table = GeoTableBuilder::new(Arc::new(MemoryBackend::new()))
            .config(config)
            .build()
            .unwrap();
        assert_eq!(table.table_name(), "loaded");
        assert_eq!(table.config().max_ranges, 4);
    }
}
