use crate::point::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Free-form string attributes attached to a record.
pub type Attributes = BTreeMap<String, String>;

/// Attribute names requested by a query projection.
pub type AttributeSet = BTreeSet<String>;

/// A geotagged record as seen by callers.
///
/// The identifier is unique within a table; writing a record with an
/// existing identifier replaces the stored one entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    pub point: GeoPoint,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Record {
    pub fn new(identifier: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            identifier: identifier.into(),
            point,
            attributes: Attributes::new(),
        }
    }

    /// Add or replace one attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace the whole attribute map.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn point(&self) -> &GeoPoint {
        &self.point
    }

    /// Keep only the attributes named in `projection`.
    pub fn project(mut self, projection: &AttributeSet) -> Self {
        self.attributes.retain(|key, _| projection.contains(key));
        self
    }
}
