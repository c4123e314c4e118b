//! Covering a bounding box with a small set of contiguous hash ranges.
//!
//! The hash space is a quad-tree: every cell of `level` bits per axis splits
//! into four children one bit pair deeper. The coverer descends it level by
//! level, keeping cells that lie fully inside the box, dropping cells that
//! miss it and splitting the rest.
//!
//! ```text
//! level 0   [            whole globe             ]  partial -> split
//! level 1   [ 00 ][ 01 ][ 10 ][ 11 ]                00 disjoint, 11 inside
//! level 2         [..][..][..][..]                  ...
//! ```
//!
//! Descent stops at full precision or once another split would exceed the
//! configured range budget; pending cells are then emitted whole. The result
//! always contains every hash inside the box, plus some slack that the exact
//! filter removes later.

use geotable_types::bbox::BoundingBox;
use geotable_types::key::{HashKeyRange, HashValue};

use super::geohash::{HashCell, bounding_hash_range, partition_key, partition_range};

/// Computes covering ranges for a fixed hash layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCoverer {
    precision_bits: u8,
    partition_bits: u8,
    max_ranges: usize,
}

/// Where a cell sits relative to the box being covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    Inside,
    Partial,
    Outside,
}

impl RangeCoverer {
    /// `precision_bits` and `partition_bits` must already be validated (see
    /// [`Config::validate`](crate::config::Config::validate)); `max_ranges`
    /// is raised to at least 1.
    pub fn new(precision_bits: u8, partition_bits: u8, max_ranges: usize) -> Self {
        Self {
            precision_bits,
            partition_bits,
            max_ranges: max_ranges.max(1),
        }
    }

    pub fn max_ranges(&self) -> usize {
        self.max_ranges
    }

    /// Cover `bbox` with ordered, non-overlapping scan ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use geotable::compute::covering::RangeCoverer;
    /// use geotable::compute::geohash::encode;
    /// use geotable_types::bbox::BoundingBox;
    /// use geotable_types::point::GeoPoint;
    ///
    /// let coverer = RangeCoverer::new(54, 0, 16);
    /// let bbox = BoundingBox::new(GeoPoint::new(40.70, -74.02), GeoPoint::new(40.80, -73.93));
    /// let ranges = coverer.cover(&bbox);
    ///
    /// let inside = encode(&GeoPoint::new(40.75, -73.98), 54);
    /// assert!(ranges.iter().any(|r| r.contains(inside)));
    /// ```
    pub fn cover(&self, bbox: &BoundingBox) -> Vec<HashKeyRange> {
        let cells = self.covering_cells(bbox);

        let mut spans: Vec<(HashValue, HashValue)> = cells
            .iter()
            .map(|cell| cell.hash_range(self.precision_bits))
            .collect();
        spans.sort_unstable();

        let mut merged = merge_spans(spans);

        if !bbox.crosses_antimeridian() {
            let (seed_from, seed_to) = bounding_hash_range(&bbox.min, &bbox.max, self.precision_bits);
            merged = merged
                .into_iter()
                .filter_map(|(from, to)| {
                    let (from, to) = (from.max(seed_from), to.min(seed_to));
                    (from <= to).then_some((from, to))
                })
                .collect();
        }

        let ranges = self.split_by_partition(&merged);
        log::debug!(
            "covered box {:?} with {} cells, {} ranges",
            bbox,
            cells.len(),
            ranges.len()
        );
        ranges
    }

    /// Quad-tree cells covering `bbox`. Their count never exceeds
    /// `max_ranges`.
    pub(crate) fn covering_cells(&self, bbox: &BoundingBox) -> Vec<HashCell> {
        let max_level = self.precision_bits / 2;
        let mut emitted: Vec<HashCell> = Vec::new();
        let mut pending: Vec<HashCell> = match classify(bbox, &HashCell::root()) {
            Overlap::Inside => return vec![HashCell::root()],
            Overlap::Outside => return Vec::new(),
            Overlap::Partial => vec![HashCell::root()],
        };

        let mut level = 0;
        while !pending.is_empty() && level < max_level {
            let mut inside: Vec<HashCell> = Vec::new();
            let mut partial: Vec<HashCell> = Vec::new();

            for cell in &pending {
                for child in cell.children() {
                    match classify(bbox, &child) {
                        Overlap::Inside => inside.push(child),
                        Overlap::Partial => partial.push(child),
                        Overlap::Outside => {}
                    }
                }
            }

            if emitted.len() + inside.len() + partial.len() > self.max_ranges {
                log::debug!(
                    "range cap {} reached at level {}; accepting {} coarse cells",
                    self.max_ranges,
                    level,
                    pending.len()
                );
                break;
            }

            emitted.extend(inside);
            pending = partial;
            level += 1;
        }

        emitted.extend(pending);
        emitted
    }

    fn split_by_partition(&self, spans: &[(HashValue, HashValue)]) -> Vec<HashKeyRange> {
        let mut ranges = Vec::with_capacity(spans.len());
        for &(from, to) in spans {
            let mut start = from;
            loop {
                let key = partition_key(start, self.precision_bits, self.partition_bits);
                let (_, partition_end) =
                    partition_range(key, self.precision_bits, self.partition_bits);
                if partition_end >= to {
                    ranges.push(HashKeyRange::new(key, start, to));
                    break;
                }
                ranges.push(HashKeyRange::new(key, start, partition_end));
                start = partition_end + 1;
            }
        }
        ranges
    }
}

fn classify(bbox: &BoundingBox, cell: &HashCell) -> Overlap {
    let bounds = cell.bounds();
    if bbox.contains(&bounds) {
        Overlap::Inside
    } else if bbox.intersects(&bounds) {
        Overlap::Partial
    } else {
        Overlap::Outside
    }
}

/// Merge sorted spans that overlap or touch.
fn merge_spans(spans: Vec<(HashValue, HashValue)>) -> Vec<(HashValue, HashValue)> {
    let mut merged: Vec<(HashValue, HashValue)> = Vec::with_capacity(spans.len());
    for (from, to) in spans {
        match merged.last_mut() {
            Some((_, last_to)) if from <= last_to.saturating_add(1) => {
                *last_to = (*last_to).max(to);
            }
            _ => merged.push((from, to)),
        }
    }
    merged
}
