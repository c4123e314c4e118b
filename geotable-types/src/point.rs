use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// A geographic point expressed as latitude and longitude in degrees.
///
/// Latitude comes first, matching how records are written by callers. The
/// conversion to [`geo::Point`] swaps the order (x = longitude, y = latitude).
///
/// # Examples
///
/// ```
/// use geotable_types::point::GeoPoint;
///
/// let nyc = GeoPoint::new(40.7128, -74.0060);
/// let brooklyn = GeoPoint::new(40.6782, -73.9442);
///
/// let distance = nyc.haversine_distance(&brooklyn);
/// assert!(distance > 6_000.0 && distance < 7_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, valid range [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, valid range [-180, 180]
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point. Coordinates are not validated here.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in meters on a spherical Earth.
    #[inline]
    pub fn haversine_distance(&self, other: &GeoPoint) -> f64 {
        Haversine.distance(Point::from(*self), Point::from(*other))
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::new(point.longitude, point.latitude)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        GeoPoint::new(point.y(), point.x())
    }
}
