use crate::point::GeoPoint;
use serde::{Deserialize, Serialize};

/// A latitude/longitude aligned bounding box.
///
/// Latitude always satisfies `min.latitude <= max.latitude`. Longitude may
/// wrap: when `min.longitude > max.longitude` the box crosses the
/// antimeridian and covers `[min.longitude, 180] ∪ [-180, max.longitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west corner
    pub min: GeoPoint,
    /// North-east corner
    pub max: GeoPoint,
}

impl BoundingBox {
    /// Create a new bounding box from its south-west and north-east corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use geotable_types::bbox::BoundingBox;
    /// use geotable_types::point::GeoPoint;
    ///
    /// // Straddles the antimeridian near Fiji
    /// let bbox = BoundingBox::new(GeoPoint::new(-20.0, 177.0), GeoPoint::new(-15.0, -178.0));
    /// assert!(bbox.crosses_antimeridian());
    /// assert!(bbox.contains_point(&GeoPoint::new(-17.0, 179.5)));
    /// assert!(bbox.contains_point(&GeoPoint::new(-17.0, -179.5)));
    /// assert!(!bbox.contains_point(&GeoPoint::new(-17.0, 0.0)));
    /// ```
    pub const fn new(min: GeoPoint, max: GeoPoint) -> Self {
        Self { min, max }
    }

    /// The whole globe.
    pub const fn world() -> Self {
        Self::new(GeoPoint::new(-90.0, -180.0), GeoPoint::new(90.0, 180.0))
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min.longitude > self.max.longitude
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.max.latitude - self.min.latitude
    }

    /// Longitude extent in degrees, accounting for antimeridian wrap.
    pub fn width(&self) -> f64 {
        if self.crosses_antimeridian() {
            (180.0 - self.min.longitude) + (self.max.longitude + 180.0)
        } else {
            self.max.longitude - self.min.longitude
        }
    }

    /// The non-wrapping longitude intervals this box covers.
    pub fn longitude_spans(&self) -> impl Iterator<Item = (f64, f64)> {
        let (first, second) = if self.crosses_antimeridian() {
            (
                (self.min.longitude, 180.0),
                Some((-180.0, self.max.longitude)),
            )
        } else {
            ((self.min.longitude, self.max.longitude), None)
        };
        std::iter::once(first).chain(second)
    }

    /// Check if a point lies inside the box. Edges are inclusive.
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        (self.min.latitude..=self.max.latitude).contains(&point.latitude)
            && self
                .longitude_spans()
                .any(|(lo, hi)| (lo..=hi).contains(&point.longitude))
    }

    /// Check if this box shares any point with a non-wrapping `cell`.
    pub fn intersects(&self, cell: &BoundingBox) -> bool {
        if cell.max.latitude < self.min.latitude || cell.min.latitude > self.max.latitude {
            return false;
        }
        self.longitude_spans()
            .any(|(lo, hi)| !(cell.max.longitude < lo || cell.min.longitude > hi))
    }

    /// Check if a non-wrapping `cell` lies entirely inside this box.
    pub fn contains(&self, cell: &BoundingBox) -> bool {
        if cell.min.latitude < self.min.latitude || cell.max.latitude > self.max.latitude {
            return false;
        }
        self.longitude_spans()
            .any(|(lo, hi)| cell.min.longitude >= lo && cell.max.longitude <= hi)
    }
}
