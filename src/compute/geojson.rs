//! GeoJSON conversion for records.
//!
//! A record becomes a `Point` feature whose `id` is the identifier and whose
//! properties are the attributes. Coordinates follow GeoJSON order
//! (longitude, latitude).

use crate::error::{GeoError, Result};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use geotable_types::point::GeoPoint;
use geotable_types::record::{Attributes, Record};

use super::validation::validate_geo_point;

/// Converts a point to a GeoJSON geometry string.
pub fn point_to_geojson(point: &GeoPoint) -> Result<String> {
    let geom = Geometry::new(Value::Point(vec![point.longitude, point.latitude]));

    serde_json::to_string(&geom).map_err(|e| {
        GeoError::SerializationErrorWithContext(format!("Failed to serialize point: {}", e))
    })
}

/// Parses a GeoJSON `Point` geometry.
pub fn point_from_geojson(geojson: &str) -> Result<GeoPoint> {
    let geom: Geometry = serde_json::from_str(geojson)
        .map_err(|e| GeoError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;
    point_from_geometry(&geom)
}

fn point_from_geometry(geom: &Geometry) -> Result<GeoPoint> {
    match &geom.value {
        Value::Point(coords) => {
            if coords.len() < 2 {
                return Err(GeoError::InvalidInput(
                    "Point must have at least 2 coordinates".to_string(),
                ));
            }
            let point = GeoPoint::new(coords[1], coords[0]);
            validate_geo_point(&point)?;
            Ok(point)
        }
        _ => Err(GeoError::InvalidInput(
            "GeoJSON geometry is not a Point".to_string(),
        )),
    }
}

/// Converts a record to a GeoJSON feature.
pub fn record_to_feature(record: &Record) -> Feature {
    let properties: JsonObject = record
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
        .collect();

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            record.point.longitude,
            record.point.latitude,
        ]))),
        id: Some(Id::String(record.identifier.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Converts a GeoJSON feature back into a record.
///
/// The feature needs a string or numeric `id` and a `Point` geometry.
/// Non-string property values are stored as their JSON text.
pub fn record_from_feature(feature: &Feature) -> Result<Record> {
    let identifier = match &feature.id {
        Some(Id::String(id)) => id.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => {
            return Err(GeoError::InvalidInput(
                "Feature has no id to use as identifier".to_string(),
            ));
        }
    };

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| GeoError::InvalidInput("Feature has no geometry".to_string()))?;
    let point = point_from_geometry(geometry)?;

    let attributes: Attributes = feature
        .properties
        .iter()
        .flatten()
        .map(|(k, v)| {
            let value = match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect();

    Ok(Record::new(identifier, point).with_attributes(attributes))
}

/// Serializes query results as a GeoJSON `FeatureCollection` string.
pub fn records_to_geojson(records: &[Record]) -> Result<String> {
    let collection = FeatureCollection {
        bbox: None,
        features: records.iter().map(record_to_feature).collect(),
        foreign_members: None,
    };

    serde_json::to_string(&collection).map_err(|e| {
        GeoError::SerializationErrorWithContext(format!(
            "Failed to serialize feature collection: {}",
            e
        ))
    })
}
