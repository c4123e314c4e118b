//! Storage backend abstraction for geotable
//!
//! The index needs an ordered key-value store where rows are grouped under a
//! partition key and sorted by `(hash, identifier)` inside each partition.
//! [`GeoBackend`] captures that contract; [`MemoryBackend`] implements it
//! with in-process B-trees.

use crate::compute::geohash::{encode, partition_key};
use crate::error::Result;
use geotable_types::key::{HashKeyRange, HashValue, PartitionKey, SortKey};
use geotable_types::point::GeoPoint;
use geotable_types::record::{AttributeSet, Attributes, Record};
use serde::{Deserialize, Serialize};
use std::future::Future;

pub mod memory;

pub use memory::MemoryBackend;

/// A stored row: the record plus its index keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRow {
    pub partition_key: PartitionKey,
    pub hash: HashValue,
    pub identifier: String,
    pub point: GeoPoint,
    #[serde(default)]
    pub attributes: Attributes,
}

impl GeoRow {
    /// Build the row for a record, deriving hash and partition key from its
    /// point. The record must already be validated.
    pub fn from_record(record: Record, precision_bits: u8, partition_bits: u8) -> Self {
        let hash = encode(&record.point, precision_bits);
        Self {
            partition_key: partition_key(hash, precision_bits, partition_bits),
            hash,
            identifier: record.identifier,
            point: record.point,
            attributes: record.attributes,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::new(self.hash, self.identifier.clone())
    }

    /// Copy of the row limited to the projected attributes.
    pub fn projected(&self, projection: Option<&AttributeSet>) -> Self {
        let mut row = self.clone();
        if let Some(projection) = projection {
            row.attributes.retain(|key, _| projection.contains(key));
        }
        row
    }

    pub fn into_record(self) -> Record {
        Record::new(self.identifier, self.point).with_attributes(self.attributes)
    }
}

/// Ordered key-value store contract used by the index.
///
/// One client is shared by every operation, so implementations take `&self`
/// and handle their own synchronization and connection pooling. Futures must
/// be `Send` so a query can fan its scans out on a multi-threaded runtime.
///
/// Failures such as timeouts, throttling or lost connections should be
/// reported as [`GeoError::BackendUnavailable`](crate::GeoError::BackendUnavailable).
pub trait GeoBackend: Send + Sync {
    /// Create the table if it does not exist yet.
    fn create_table(&self, table: &str) -> impl Future<Output = Result<()>> + Send;

    /// Insert or fully replace the row with the same identifier, even if its
    /// keys changed.
    fn put_row(&self, table: &str, row: GeoRow) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a row by identifier.
    fn get_row(
        &self,
        table: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<GeoRow>>> + Send;

    /// Delete a row by identifier alone, returning it if it existed.
    fn delete_row(
        &self,
        table: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<GeoRow>>> + Send;

    /// Rows in partition `range.hash_key` whose hash lies in the inclusive
    /// interval, in sort-key order. `projection` limits the returned
    /// attributes; identifier and point are always present.
    fn query_range(
        &self,
        table: &str,
        range: &HashKeyRange,
        projection: Option<&AttributeSet>,
    ) -> impl Future<Output = Result<Vec<GeoRow>>> + Send;

    /// Rows whose attribute `attribute` equals `value`. A full scan; the geo
    /// index never calls it.
    fn scan_eq(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<GeoRow>>> + Send;
}

/// Storage backend statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of tables
    pub table_count: usize,
    /// Total number of rows across tables
    pub row_count: usize,
    /// Number of non-empty partitions across tables
    pub partition_count: usize,
    /// Number of operations performed
    pub operations_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keys_derive_from_point() {
        let record = Record::new("r", GeoPoint::new(45.0, 90.0)).with_attribute("k", "v");
        let row = GeoRow::from_record(record.clone(), 10, 2);
        assert_eq!(row.hash, encode(&record.point, 10));
        assert_eq!(row.partition_key, 0b11);
        assert_eq!(row.sort_key(), SortKey::new(row.hash, "r"));
        assert_eq!(row.into_record(), record);
    }

    #[test]
    fn test_row_projection() {
        let record = Record::new("r", GeoPoint::new(1.0, 1.0))
            .with_attribute("a", "1")
            .with_attribute("b", "2");
        let row = GeoRow::from_record(record, 54, 0);

        let projection: AttributeSet = ["b".to_string()].into();
        let projected = row.projected(Some(&projection));
        assert_eq!(projected.attributes.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(row.projected(None), row);
    }
}
