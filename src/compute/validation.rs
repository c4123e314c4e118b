//! Validation for coordinates, radii, identifiers and hash settings.
//!
//! Everything here runs before a backend call so bad input never reaches
//! storage.

use crate::config::MAX_PRECISION_BITS;
use crate::error::{GeoError, Result};
use geotable_types::point::GeoPoint;
use geotable_types::record::Record;

/// Validates a point has valid latitude and longitude.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use geotable::compute::validation::validate_geo_point;
/// use geotable_types::point::GeoPoint;
///
/// // Valid point
/// let nyc = GeoPoint::new(40.7128, -74.0060);
/// assert!(validate_geo_point(&nyc).is_ok());
///
/// // Invalid latitude
/// let invalid = GeoPoint::new(95.0, -74.0);
/// assert!(validate_geo_point(&invalid).is_err());
/// ```
pub fn validate_geo_point(point: &GeoPoint) -> Result<()> {
    let (lat, lon) = (point.latitude, point.longitude);

    if !lat.is_finite() {
        return Err(GeoError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !lon.is_finite() {
        return Err(GeoError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeoError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(GeoError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    Ok(())
}

/// Validates a search radius in meters.
///
/// Zero is allowed and simply matches nothing; negative or non-finite radii
/// are rejected.
pub fn validate_radius(radius_meters: f64) -> Result<()> {
    if !radius_meters.is_finite() {
        return Err(GeoError::InvalidInput(format!(
            "Radius must be finite, got: {}",
            radius_meters
        )));
    }

    if radius_meters < 0.0 {
        return Err(GeoError::InvalidInput(format!(
            "Radius must not be negative, got: {}",
            radius_meters
        )));
    }

    Ok(())
}

/// Validates a record identifier.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(GeoError::InvalidInput(
            "Identifier must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a hash width: even, between 2 and 62 bits.
pub fn validate_precision_bits(precision_bits: u8) -> Result<()> {
    if precision_bits < 2 || precision_bits > MAX_PRECISION_BITS || precision_bits % 2 != 0 {
        return Err(GeoError::InvalidInput(format!(
            "Precision must be an even number of bits in [2, {}], got: {}",
            MAX_PRECISION_BITS, precision_bits
        )));
    }
    Ok(())
}

/// Validates a record before it is written.
pub fn validate_record(record: &Record) -> Result<()> {
    validate_identifier(&record.identifier)?;
    validate_geo_point(&record.point).map_err(|e| {
        GeoError::InvalidInput(format!("Record {:?}: {}", record.identifier, e))
    })
}

/// Validates multiple records, reporting the first offending index.
pub fn validate_records(records: &[Record]) -> Result<()> {
    for (idx, record) in records.iter().enumerate() {
        validate_record(record)
            .map_err(|e| GeoError::InvalidInput(format!("Record at index {}: {}", idx, e)))?;
    }
    Ok(())
}
