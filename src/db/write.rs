//! Writing and removing points.

use super::GeoTable;
use crate::compute::validation::{validate_identifier, validate_record, validate_records};
use crate::error::{GeoError, Result};
use crate::storage::{GeoBackend, GeoRow};
use futures::{TryStreamExt, stream};
use geotable_types::record::Record;
use rustc_hash::FxHashMap;
use std::time::Instant;

impl<B: GeoBackend> GeoTable<B> {
    /// Insert a record, or fully replace the record with the same identifier.
    ///
    /// The hash and partition key are always derived from `record.point`.
    /// Attributes of a replaced record are not merged: the new attribute map
    /// is stored as-is.
    pub async fn put_point(&self, record: Record) -> Result<()> {
        validate_record(&record)?;
        let started = Instant::now();

        let row = self.row_for(record);
        let identifier = row.identifier.clone();
        self.backend().put_row(self.table_name(), row).await?;

        log::debug!("stored {:?} in {:?}", identifier, started.elapsed());
        Ok(())
    }

    /// Write many records. Every record is validated before anything is
    /// written; writes then run concurrently as independent single-row puts,
    /// at most `max_concurrent_scans` at a time.
    /// If a batch repeats an identifier, the last occurrence is stored.
    pub async fn put_points(&self, records: Vec<Record>) -> Result<()> {
        validate_records(&records)?;
        let started = Instant::now();

        let mut positions: FxHashMap<String, usize> = FxHashMap::default();
        let mut unique: Vec<Record> = Vec::with_capacity(records.len());
        for record in records {
            match positions.get(&record.identifier) {
                Some(&idx) => unique[idx] = record,
                None => {
                    positions.insert(record.identifier.clone(), unique.len());
                    unique.push(record);
                }
            }
        }

        let count = unique.len();
        let backend = self.backend().as_ref();
        let table = self.table_name();
        let rows = unique
            .into_iter()
            .map(|record| Ok::<_, GeoError>(self.row_for(record)));
        stream::iter(rows)
            .try_for_each_concurrent(self.config().max_concurrent_scans, |row| {
                backend.put_row(table, row)
            })
            .await?;

        log::debug!("stored {} records in {:?}", count, started.elapsed());
        Ok(())
    }

    /// Fetch a record by identifier.
    pub async fn get_point(&self, identifier: &str) -> Result<Option<Record>> {
        validate_identifier(identifier)?;
        let row = self.backend().get_row(self.table_name(), identifier).await?;
        Ok(row.map(GeoRow::into_record))
    }

    /// Delete a record by identifier, returning it if it existed.
    pub async fn delete_point(&self, identifier: &str) -> Result<Option<Record>> {
        validate_identifier(identifier)?;
        let removed = self
            .backend()
            .delete_row(self.table_name(), identifier)
            .await?;

        if removed.is_none() {
            log::debug!("delete of unknown record {:?}", identifier);
        }
        Ok(removed.map(GeoRow::into_record))
    }

    fn row_for(&self, record: Record) -> GeoRow {
        GeoRow::from_record(
            record,
            self.config().precision_bits,
            self.config().partition_bits,
        )
    }
}
