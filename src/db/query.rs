//! Radius and rectangle queries.
//!
//! A query turns its region into a bounding box, covers the box with at most
//! `max_ranges` hash ranges, scans the ranges concurrently and filters the
//! candidates exactly. Any failed scan fails the whole query.

use super::GeoTable;
use crate::compute::filter::{within_box, within_radius};
use crate::compute::region::bounding_box;
use crate::compute::validation::{validate_geo_point, validate_radius};
use crate::error::{GeoError, Result};
use crate::storage::{GeoBackend, GeoRow};
use futures::{StreamExt, TryStreamExt, stream};
use geotable_types::bbox::BoundingBox;
use geotable_types::key::HashKeyRange;
use geotable_types::point::GeoPoint;
use geotable_types::record::{AttributeSet, Record};
use rustc_hash::FxHashMap;
use std::time::Instant;

/// Find records within `radius_meters` of `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRadiusRequest {
    pub center: GeoPoint,
    pub radius_meters: f64,
    /// Attributes to return. `None` returns all of them.
    pub attributes_to_get: Option<AttributeSet>,
}

impl QueryRadiusRequest {
    pub fn new(center: GeoPoint, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
            attributes_to_get: None,
        }
    }

    pub fn with_attributes_to_get<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_to_get = Some(attributes.into_iter().map(Into::into).collect());
        self
    }
}

/// Find records inside the box spanned by `min` and `max`.
///
/// `min.longitude > max.longitude` selects a box crossing the antimeridian.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRectangleRequest {
    pub min: GeoPoint,
    pub max: GeoPoint,
    pub attributes_to_get: Option<AttributeSet>,
}

impl QueryRectangleRequest {
    pub fn new(min: GeoPoint, max: GeoPoint) -> Self {
        Self {
            min,
            max,
            attributes_to_get: None,
        }
    }

    pub fn with_attributes_to_get<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_to_get = Some(attributes.into_iter().map(Into::into).collect());
        self
    }
}

impl<B: GeoBackend> GeoTable<B> {
    /// Every stored record whose great-circle distance from the center is at
    /// most the radius. A radius of zero returns no records without touching
    /// the backend.
    ///
    /// Result order is unspecified; each identifier appears at most once.
    pub async fn query_radius(&self, request: &QueryRadiusRequest) -> Result<Vec<Record>> {
        validate_geo_point(&request.center)?;
        validate_radius(request.radius_meters)?;

        let Some(bbox) = bounding_box(&request.center, request.radius_meters) else {
            return Ok(Vec::new());
        };

        let started = Instant::now();
        let candidates = self
            .scan_box(&bbox, request.attributes_to_get.as_ref())
            .await?;
        let candidate_count = candidates.len();
        let results = within_radius(candidates, &request.center, request.radius_meters);

        log::debug!(
            "radius query at ({}, {}) r={}m: {} candidates, {} results in {:?}",
            request.center.latitude,
            request.center.longitude,
            request.radius_meters,
            candidate_count,
            results.len(),
            started.elapsed()
        );
        Ok(results)
    }

    /// Every stored record inside the rectangle, edges included.
    pub async fn query_rectangle(&self, request: &QueryRectangleRequest) -> Result<Vec<Record>> {
        validate_geo_point(&request.min)?;
        validate_geo_point(&request.max)?;
        if request.min.latitude > request.max.latitude {
            return Err(GeoError::InvalidInput(format!(
                "Rectangle min latitude {} is above max latitude {}",
                request.min.latitude, request.max.latitude
            )));
        }

        let started = Instant::now();
        let bbox = BoundingBox::new(request.min, request.max);
        let candidates = self
            .scan_box(&bbox, request.attributes_to_get.as_ref())
            .await?;
        let candidate_count = candidates.len();
        let results = within_box(candidates, &bbox);

        log::debug!(
            "rectangle query {:?}: {} candidates, {} results in {:?}",
            bbox,
            candidate_count,
            results.len(),
            started.elapsed()
        );
        Ok(results)
    }

    async fn scan_box(
        &self,
        bbox: &BoundingBox,
        projection: Option<&AttributeSet>,
    ) -> Result<Vec<Record>> {
        let ranges = self.covering_ranges(bbox);
        let batches = self.scan_ranges(&ranges, projection).await?;
        Ok(merge_batches(batches))
    }

    /// Scan every range with at most `max_concurrent_scans` in flight. The
    /// first failure drops the scans still running.
    async fn scan_ranges(
        &self,
        ranges: &[HashKeyRange],
        projection: Option<&AttributeSet>,
    ) -> Result<Vec<Vec<GeoRow>>> {
        let backend = self.backend().as_ref();
        let table = self.table_name();

        let scans = stream::iter(ranges.iter().copied())
            .map(move |range| async move {
                backend
                    .query_range(table, &range, projection)
                    .await
                    .map_err(|e| scan_failed(&range, e))
            })
            .buffer_unordered(self.config().max_concurrent_scans)
            .try_collect::<Vec<_>>();

        match self.config().query_timeout() {
            Some(limit) => tokio::time::timeout(limit, scans).await.map_err(|_| {
                GeoError::BackendUnavailable(format!(
                    "{} range scans did not finish within {:?}",
                    ranges.len(),
                    limit
                ))
            })?,
            None => scans.await,
        }
    }
}

fn scan_failed(range: &HashKeyRange, err: GeoError) -> GeoError {
    match err {
        GeoError::BackendUnavailable(msg) => GeoError::BackendUnavailable(format!(
            "scan of partition {} [{}, {}] failed: {}",
            range.hash_key, range.range_key_from, range.range_key_to, msg
        )),
        other => other,
    }
}

/// Flatten scan results keeping one record per identifier. A later copy
/// replaces an earlier one in place.
fn merge_batches(batches: Vec<Vec<GeoRow>>) -> Vec<Record> {
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();
    let mut records: Vec<Record> = Vec::new();

    for row in batches.into_iter().flatten() {
        let record = row.into_record();
        match positions.get(&record.identifier) {
            Some(&idx) => records[idx] = record,
            None => {
                positions.insert(record.identifier.clone(), records.len());
                records.push(record);
            }
        }
    }
    records
}
