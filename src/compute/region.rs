//! Bounding region for a radius search.

use geotable_types::bbox::BoundingBox;
use geotable_types::point::GeoPoint;

/// Mean Earth radius used to turn meters into angles.
///
/// Slightly below the radius used by the exact filter, so the angular box is
/// never smaller than the circle it has to contain.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Conservative latitude/longitude box around a circle.
///
/// The latitude half-height is the angular radius `d = r / R`. The longitude
/// half-width is `asin(sin d / cos lat)`, the widest longitude reached by the
/// circle, which grows as meridians converge towards the poles. Latitude is
/// clamped to [-90, 90]; longitude wraps at ±180, producing a box that
/// crosses the antimeridian. If the circle reaches a pole, or its longitude
/// extent would cover the whole parallel, the box spans every longitude.
///
/// Returns `None` for a radius ≤ 0 (or non-finite): the empty region.
///
/// # Examples
///
/// ```
/// use geotable::compute::region::bounding_box;
/// use geotable_types::point::GeoPoint;
///
/// let nyc = GeoPoint::new(40.7128, -74.0060);
/// let bbox = bounding_box(&nyc, 1000.0).unwrap();
/// assert!(bbox.contains_point(&nyc));
/// assert!(bbox.width() > bbox.height()); // meridians converge at 40°N
///
/// assert!(bounding_box(&nyc, 0.0).is_none());
/// ```
pub fn bounding_box(center: &GeoPoint, radius_meters: f64) -> Option<BoundingBox> {
    if !(radius_meters.is_finite() && radius_meters > 0.0) {
        return None;
    }

    let angular = radius_meters / EARTH_RADIUS_METERS;
    let lat_delta = angular.to_degrees();

    let min_lat = center.latitude - lat_delta;
    let max_lat = center.latitude + lat_delta;

    if min_lat <= -90.0 || max_lat >= 90.0 || angular >= std::f64::consts::FRAC_PI_2 {
        return Some(BoundingBox::new(
            GeoPoint::new(min_lat.max(-90.0), -180.0),
            GeoPoint::new(max_lat.min(90.0), 180.0),
        ));
    }

    let ratio = angular.sin() / center.latitude.to_radians().cos();
    if ratio >= 1.0 {
        return Some(BoundingBox::new(
            GeoPoint::new(min_lat, -180.0),
            GeoPoint::new(max_lat, 180.0),
        ));
    }

    let lon_delta = ratio.asin().to_degrees();
    if lon_delta >= 180.0 {
        return Some(BoundingBox::new(
            GeoPoint::new(min_lat, -180.0),
            GeoPoint::new(max_lat, 180.0),
        ));
    }

    Some(BoundingBox::new(
        GeoPoint::new(min_lat, wrap_longitude(center.longitude - lon_delta)),
        GeoPoint::new(max_lat, wrap_longitude(center.longitude + lon_delta)),
    ))
}

/// Bring a longitude back into [-180, 180].
pub fn wrap_longitude(longitude: f64) -> f64 {
    if longitude > 180.0 {
        longitude - 360.0
    } else if longitude < -180.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_radius_is_empty() {
        let center = GeoPoint::new(0.0, 0.0);
        assert!(bounding_box(&center, 0.0).is_none());
        assert!(bounding_box(&center, -5.0).is_none());
        assert!(bounding_box(&center, f64::NAN).is_none());
    }

    #[test]
    fn test_equator_box_is_square() {
        let bbox = bounding_box(&GeoPoint::new(0.0, 0.0), 111_195.0).unwrap();
        assert!((bbox.height() - 2.0).abs() < 0.01);
        assert!((bbox.width() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_longitude_widens_with_latitude() {
        let low = bounding_box(&GeoPoint::new(10.0, 0.0), 10_000.0).unwrap();
        let high = bounding_box(&GeoPoint::new(70.0, 0.0), 10_000.0).unwrap();
        assert!((low.height() - high.height()).abs() < 1e-9);
        assert!(high.width() > 2.5 * low.width());
    }

    #[test]
    fn test_box_contains_circle_extremes() {
        let center = GeoPoint::new(60.0, 25.0);
        let radius = 50_000.0;
        let bbox = bounding_box(&center, radius).unwrap();

        for bearing in (0..360).step_by(5) {
            let point = destination(&center, radius * 0.999, f64::from(bearing));
            assert!(bbox.contains_point(&point), "bearing {bearing}: {point:?}");
        }
    }

    #[test]
    fn test_antimeridian_wraps() {
        let bbox = bounding_box(&GeoPoint::new(-17.0, 179.9), 50_000.0).unwrap();
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.contains_point(&GeoPoint::new(-17.0, -179.9)));
        assert!(bbox.contains_point(&GeoPoint::new(-17.0, 179.5)));
    }

    #[test]
    fn test_pole_spans_all_longitudes() {
        let bbox = bounding_box(&GeoPoint::new(89.9, 10.0), 50_000.0).unwrap();
        assert_eq!(bbox.max.latitude, 90.0);
        assert_eq!(bbox.min.longitude, -180.0);
        assert_eq!(bbox.max.longitude, 180.0);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(45.0), 45.0);
    }

    /// Point reached by travelling `distance` meters on `bearing` degrees.
    fn destination(start: &GeoPoint, distance: f64, bearing: f64) -> GeoPoint {
        let d = distance / 6_371_008.8;
        let theta = bearing.to_radians();
        let lat1 = start.latitude.to_radians();
        let lon1 = start.longitude.to_radians();
        let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
        GeoPoint::new(lat2.to_degrees(), wrap_longitude(lon2.to_degrees()))
    }
}
