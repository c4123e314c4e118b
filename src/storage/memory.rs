//! In-memory storage backend implementation.

use super::{GeoBackend, GeoRow, StorageStats};
use crate::error::{GeoError, Result};
use geotable_types::key::{HashKeyRange, PartitionKey, SortKey};
use geotable_types::record::AttributeSet;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

/// One table: partitions of sorted rows plus an identifier index so rows
/// can be replaced or deleted without knowing their keys.
#[derive(Debug, Default)]
struct MemoryTable {
    partitions: BTreeMap<PartitionKey, BTreeMap<SortKey, GeoRow>>,
    by_identifier: FxHashMap<String, (PartitionKey, SortKey)>,
}

impl MemoryTable {
    fn put(&mut self, row: GeoRow) {
        self.remove(&row.identifier);
        let sort_key = row.sort_key();
        self.by_identifier
            .insert(row.identifier.clone(), (row.partition_key, sort_key.clone()));
        self.partitions
            .entry(row.partition_key)
            .or_default()
            .insert(sort_key, row);
    }

    fn get(&self, identifier: &str) -> Option<&GeoRow> {
        let (partition, sort_key) = self.by_identifier.get(identifier)?;
        self.partitions.get(partition)?.get(sort_key)
    }

    fn remove(&mut self, identifier: &str) -> Option<GeoRow> {
        let (partition, sort_key) = self.by_identifier.remove(identifier)?;
        let rows = self.partitions.get_mut(&partition)?;
        let removed = rows.remove(&sort_key);
        if rows.is_empty() {
            self.partitions.remove(&partition);
        }
        removed
    }

    fn range(&self, range: &HashKeyRange) -> impl Iterator<Item = &GeoRow> {
        let start = SortKey::new(range.range_key_from, String::new());
        let to = range.range_key_to;
        self.partitions
            .get(&range.hash_key)
            .into_iter()
            .flat_map(move |rows| {
                rows.range((Bound::Included(start.clone()), Bound::Unbounded))
                    .take_while(move |(key, _)| key.hash <= to)
                    .map(|(_, row)| row)
            })
    }

    fn len(&self) -> usize {
        self.by_identifier.len()
    }
}

/// In-memory backend using B-trees per partition.
///
/// Useful for tests and for embedding the index without an external store.
/// All operations take a short `RwLock` critical section, so single-row
/// writes are atomic and concurrent reads don't block each other.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<FxHashMap<String, MemoryTable>>,
    operations: AtomicU64,
}

impl MemoryBackend {
    /// Create a new in-memory storage backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with the given tables already present.
    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        {
            let mut guard = backend.tables.write();
            for table in tables {
                guard.entry(table.into()).or_default();
            }
        }
        backend
    }

    /// Number of rows in a table, or `None` if it does not exist.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(MemoryTable::len)
    }

    pub fn stats(&self) -> StorageStats {
        let tables = self.tables.read();
        StorageStats {
            table_count: tables.len(),
            row_count: tables.values().map(MemoryTable::len).sum(),
            partition_count: tables.values().map(|t| t.partitions.len()).sum(),
            operations_count: self.operations.load(Ordering::Relaxed),
        }
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }
}

fn missing_table(table: &str) -> GeoError {
    GeoError::BackendUnavailable(format!("table {:?} does not exist", table))
}

impl GeoBackend for MemoryBackend {
    async fn create_table(&self, table: &str) -> Result<()> {
        self.record_operation();
        self.tables.write().entry(table.to_string()).or_default();
        Ok(())
    }

    async fn put_row(&self, table: &str, row: GeoRow) -> Result<()> {
        self.record_operation();
        let mut tables = self.tables.write();
        let table = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        table.put(row);
        Ok(())
    }

    async fn get_row(&self, table: &str, identifier: &str) -> Result<Option<GeoRow>> {
        self.record_operation();
        let tables = self.tables.read();
        let table = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(table.get(identifier).cloned())
    }

    async fn delete_row(&self, table: &str, identifier: &str) -> Result<Option<GeoRow>> {
        self.record_operation();
        let mut tables = self.tables.write();
        let table = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        Ok(table.remove(identifier))
    }

    async fn query_range(
        &self,
        table: &str,
        range: &HashKeyRange,
        projection: Option<&AttributeSet>,
    ) -> Result<Vec<GeoRow>> {
        self.record_operation();
        let tables = self.tables.read();
        let table = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(table
            .range(range)
            .map(|row| row.projected(projection))
            .collect())
    }

    async fn scan_eq(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<GeoRow>> {
        self.record_operation();
        let tables = self.tables.read();
        let table = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(table
            .partitions
            .values()
            .flat_map(BTreeMap::values)
            .filter(|row| row.attributes.get(attribute).map(String::as_str) == Some(value))
            .cloned()
            .collect())
    }
}
