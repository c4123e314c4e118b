//! Interleaved-bit geohash codec.
//!
//! A hash of `precision_bits` bits holds `precision_bits / 2` quantized bits
//! of latitude and the same number of longitude bits, interleaved latitude
//! first and most significant first. Comparing hashes numerically walks the
//! globe in Z-order, so nearby points usually (not always) get nearby values.
//!
//! ```text
//! precision_bits = 4          lat bits  a1 a0      lon bits  o1 o0
//! hash (low 4 bits)  = a1 o1 a0 o0
//! ```

use crate::error::Result;
use geotable_types::bbox::BoundingBox;
use geotable_types::key::{HashValue, PartitionKey};
use geotable_types::point::GeoPoint;

use super::validation::{validate_geo_point, validate_precision_bits};

const LAT_MIN: f64 = -90.0;
const LAT_MAX: f64 = 90.0;
const LON_MIN: f64 = -180.0;
const LON_MAX: f64 = 180.0;

/// A quad-tree cell: the first `level` bits of each axis, interleaved into
/// `prefix` (which therefore holds `2 * level` bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashCell {
    pub prefix: u64,
    pub level: u8,
}

impl HashCell {
    /// The cell covering the whole globe.
    pub const fn root() -> Self {
        Self {
            prefix: 0,
            level: 0,
        }
    }

    /// The full-precision cell a hash value denotes.
    pub fn from_hash(hash: HashValue, precision_bits: u8) -> Self {
        Self {
            prefix: hash & low_mask(u32::from(precision_bits)),
            level: precision_bits / 2,
        }
    }

    /// The four sub-cells one bit pair deeper, in hash order.
    pub fn children(&self) -> [HashCell; 4] {
        let level = self.level + 1;
        let base = self.prefix << 2;
        [0, 1, 2, 3].map(|quadrant| HashCell {
            prefix: base | quadrant,
            level,
        })
    }

    /// Latitude/longitude extent of the cell.
    pub fn bounds(&self) -> BoundingBox {
        let (lat_index, lon_index) = deinterleave(self.prefix, u32::from(self.level));
        let cells = (1u64 << self.level) as f64;
        let lat_step = (LAT_MAX - LAT_MIN) / cells;
        let lon_step = (LON_MAX - LON_MIN) / cells;

        let min_lat = LAT_MIN + lat_index as f64 * lat_step;
        let min_lon = LON_MIN + lon_index as f64 * lon_step;

        BoundingBox::new(
            GeoPoint::new(min_lat, min_lon),
            GeoPoint::new(min_lat + lat_step, min_lon + lon_step),
        )
    }

    /// Inclusive range of full-precision hash values inside the cell.
    pub fn hash_range(&self, precision_bits: u8) -> (HashValue, HashValue) {
        let shift = u32::from(precision_bits) - 2 * u32::from(self.level);
        let from = self.prefix << shift;
        (from, from | low_mask(shift))
    }
}

/// Hash a point. The point must already be valid; use [`try_encode`] for
/// unchecked input.
///
/// # Examples
///
/// ```
/// use geotable::compute::geohash::encode;
/// use geotable_types::point::GeoPoint;
///
/// // One bit per axis: north-east quadrant is 0b11
/// assert_eq!(encode(&GeoPoint::new(10.0, 10.0), 2), 0b11);
/// assert_eq!(encode(&GeoPoint::new(-10.0, 10.0), 2), 0b01);
/// assert_eq!(encode(&GeoPoint::new(10.0, -10.0), 2), 0b10);
/// ```
pub fn encode(point: &GeoPoint, precision_bits: u8) -> HashValue {
    let bits = u32::from(precision_bits / 2);
    let lat_index = quantize(point.latitude, LAT_MIN, LAT_MAX, bits);
    let lon_index = quantize(point.longitude, LON_MIN, LON_MAX, bits);
    interleave(lat_index, lon_index, bits)
}

/// Validating variant of [`encode`].
pub fn try_encode(point: &GeoPoint, precision_bits: u8) -> Result<HashValue> {
    validate_precision_bits(precision_bits)?;
    validate_geo_point(point)?;
    Ok(encode(point, precision_bits))
}

/// The cell a hash value denotes. Any point that encodes to `hash` lies
/// inside the returned box.
pub fn decode(hash: HashValue, precision_bits: u8) -> BoundingBox {
    HashCell::from_hash(hash, precision_bits).bounds()
}

/// Hashes of the south-west and north-east corners of a box.
///
/// For a box that does not cross the antimeridian every point inside hashes
/// into `[min, max]`, since interleaving is monotone in each axis.
pub fn bounding_hash_range(
    min: &GeoPoint,
    max: &GeoPoint,
    precision_bits: u8,
) -> (HashValue, HashValue) {
    (encode(min, precision_bits), encode(max, precision_bits))
}

/// Partition key of a hash: its top `partition_bits` bits.
pub fn partition_key(hash: HashValue, precision_bits: u8, partition_bits: u8) -> PartitionKey {
    if partition_bits == 0 {
        return 0;
    }
    hash >> (precision_bits - partition_bits)
}

/// Inclusive hash range owned by one partition.
pub fn partition_range(
    key: PartitionKey,
    precision_bits: u8,
    partition_bits: u8,
) -> (HashValue, HashValue) {
    let shift = u32::from(precision_bits - partition_bits);
    let from = key << shift;
    (from, from | low_mask(shift))
}

fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn quantize(value: f64, min: f64, max: f64, bits: u32) -> u64 {
    let cells = 1u64 << bits;
    let scaled = ((value - min) / (max - min) * cells as f64).floor();
    if scaled <= 0.0 {
        0
    } else {
        (scaled as u64).min(cells - 1)
    }
}

fn interleave(lat_index: u64, lon_index: u64, bits: u32) -> u64 {
    (0..bits).rev().fold(0u64, |hash, i| {
        let lat_bit = (lat_index >> i) & 1;
        let lon_bit = (lon_index >> i) & 1;
        (hash << 2) | (lat_bit << 1) | lon_bit
    })
}

fn deinterleave(hash: u64, bits: u32) -> (u64, u64) {
    (0..bits).rev().fold((0u64, 0u64), |(lat, lon), i| {
        let lat_bit = (hash >> (2 * i + 1)) & 1;
        let lon_bit = (hash >> (2 * i)) & 1;
        ((lat << 1) | lat_bit, (lon << 1) | lon_bit)
    })
}
