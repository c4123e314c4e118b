//! Exact filtering of candidate records.
//!
//! Covering ranges are a superset of the search area. These helpers decide
//! authoritatively whether a record is inside it.

use geo::{Distance, Haversine, Point};
use geotable_types::bbox::BoundingBox;
use geotable_types::point::GeoPoint;
use geotable_types::record::Record;

/// Great-circle distance in meters (haversine on a spherical Earth).
///
/// # Examples
///
/// ```rust
/// use geotable::compute::filter::haversine_distance;
/// use geotable_types::point::GeoPoint;
///
/// let nyc = GeoPoint::new(40.7128, -74.0060);
/// let la = GeoPoint::new(34.0522, -118.2437);
/// assert!(haversine_distance(&nyc, &la) > 3_900_000.0); // ~3,944 km
/// ```
#[inline]
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Haversine.distance(Point::from(*a), Point::from(*b))
}

/// Keep records whose distance to `center` is at most `radius_meters`.
/// A record exactly on the circle is kept.
pub fn within_radius(records: Vec<Record>, center: &GeoPoint, radius_meters: f64) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| haversine_distance(&record.point, center) <= radius_meters)
        .collect()
}

/// Keep records inside `bbox` (edges inclusive, antimeridian aware).
pub fn within_box(records: Vec<Record>, bbox: &BoundingBox) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| bbox.contains_point(&record.point))
        .collect()
}

/// Pair each record with its distance to `center`, nearest first.
///
/// Query results carry no ordering guarantee; callers that want a ranking
/// sort with this.
pub fn sort_by_distance(records: Vec<Record>, center: &GeoPoint) -> Vec<(Record, f64)> {
    let mut with_distance: Vec<(Record, f64)> = records
        .into_iter()
        .map(|record| {
            let distance = haversine_distance(&record.point, center);
            (record, distance)
        })
        .collect();

    with_distance.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    with_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, lat: f64, lon: f64) -> Record {
        Record::new(id, GeoPoint::new(lat, lon))
    }

    #[test]
    fn test_haversine_distance_uses_lon_lat_order() {
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);

        let expected = Haversine.distance(Point::new(2.3522, 48.8566), Point::new(-0.1278, 51.5074));
        assert_eq!(haversine_distance(&paris, &london), expected);
        assert_eq!(haversine_distance(&london, &paris), expected);
        assert!((330_000.0..350_000.0).contains(&expected), "got {expected}");
    }

    #[test]
    fn test_within_radius_new_york() {
        let center = GeoPoint::new(40.7128, -74.0060);
        let kept = within_radius(
            vec![
                record("near", 40.7130, -74.0065),
                record("queens", 40.730, -73.935),
            ],
            &center,
            1000.0,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identifier, "near");
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let center = GeoPoint::new(10.0, 20.0);
        let edge = record("edge", 10.01, 20.01);
        let exact = haversine_distance(&edge.point, &center);

        assert_eq!(within_radius(vec![edge.clone()], &center, exact).len(), 1);
        assert!(within_radius(vec![edge], &center, exact - 1e-6).is_empty());
    }

    #[test]
    fn test_within_box() {
        let bbox = BoundingBox::new(GeoPoint::new(-1.0, 179.0), GeoPoint::new(1.0, -179.0));
        let kept = within_box(
            vec![
                record("east", 0.0, 179.5),
                record("west", 0.0, -179.5),
                record("outside", 0.0, 0.0),
            ],
            &bbox,
        );
        let ids: Vec<_> = kept.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["east", "west"]);
    }

    #[test]
    fn test_sort_by_distance() {
        let center = GeoPoint::new(0.0, 0.0);
        let sorted = sort_by_distance(
            vec![
                record("far", 0.0, 2.0),
                record("here", 0.0, 0.0),
                record("mid", 0.0, 1.0),
            ],
            &center,
        );
        let ids: Vec<_> = sorted.iter().map(|(r, _)| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["here", "mid", "far"]);
        assert_eq!(sorted[0].1, 0.0);
    }
}
