//! The geo table: configuration plus a shared backend handle.
//!
//! Writes live in [`write`], radius and rectangle queries in [`query`].

use crate::builder::GeoTableBuilder;
use crate::compute::covering::RangeCoverer;
use crate::compute::geohash::try_encode;
use crate::config::Config;
use crate::error::{GeoError, Result};
use crate::storage::GeoBackend;
use geotable_types::bbox::BoundingBox;
use geotable_types::key::{HashKeyRange, HashValue};
use geotable_types::point::GeoPoint;
use std::sync::Arc;

pub mod query;
pub mod write;

pub use query::{QueryRadiusRequest, QueryRectangleRequest};

/// Geohash-indexed table of records on top of a [`GeoBackend`].
///
/// The backend is held in an `Arc` and shared by every clone, so one client
/// (and its connection pool) serves all operations.
///
/// # Examples
///
/// ```rust
/// use geotable::{GeoTable, MemoryBackend, QueryRadiusRequest};
/// use geotable_types::point::GeoPoint;
/// use geotable_types::record::Record;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> geotable::Result<()> {
/// let table = GeoTable::builder(Arc::new(MemoryBackend::new()))
///     .table_name("posts")
///     .build()?;
/// table.create_table().await?;
///
/// let nyc = GeoPoint::new(40.7128, -74.0060);
/// table.put_point(Record::new("pizza", GeoPoint::new(40.7130, -74.0065))).await?;
///
/// let found = table.query_radius(&QueryRadiusRequest::new(nyc, 1000.0)).await?;
/// assert_eq!(found.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GeoTable<B> {
    backend: Arc<B>,
    config: Config,
    coverer: RangeCoverer,
}

impl<B> Clone for GeoTable<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
            coverer: self.coverer,
        }
    }
}

impl<B: GeoBackend> GeoTable<B> {
    /// Create a table handle after validating `config`.
    pub fn new(backend: Arc<B>, config: Config) -> Result<Self> {
        config.validate().map_err(GeoError::InvalidInput)?;
        let coverer = RangeCoverer::new(
            config.precision_bits,
            config.partition_bits,
            config.max_ranges,
        );
        Ok(Self {
            backend,
            config,
            coverer,
        })
    }

    /// Start building a table handle around `backend`.
    pub fn builder(backend: Arc<B>) -> GeoTableBuilder<B> {
        GeoTableBuilder::new(backend)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Create the backing table if it is missing.
    pub async fn create_table(&self) -> Result<()> {
        self.backend.create_table(&self.config.table_name).await?;
        log::info!(
            "table {:?} ready ({} bit hashes, {} partition bits)",
            self.config.table_name,
            self.config.precision_bits,
            self.config.partition_bits
        );
        Ok(())
    }

    /// Hash a point with this table's precision.
    pub fn hash_of(&self, point: &GeoPoint) -> Result<HashValue> {
        try_encode(point, self.config.precision_bits)
    }

    /// Scan ranges that a query over `bbox` would issue.
    pub fn covering_ranges(&self, bbox: &BoundingBox) -> Vec<HashKeyRange> {
        self.coverer.cover(bbox)
    }
}
