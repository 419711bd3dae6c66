//! Great-circle distance between geographic coordinates.

use geo::{algorithm::HaversineDistance, geometry::Point};

/// Returns the great-circle distance, in meters, between
/// (`lat1`, `lon1`) and (`lat2`, `lon2`).
///
/// Uses the haversine formula over geo's mean earth radius
/// (6,371,008.8 m).
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = Point::new(lon1, lat1);
    let p2 = Point::new(lon2, lat2);
    p1.haversine_distance(&p2)
}

/// Offsets, in degrees, spanning `dist_m` meters north-south and
/// east-west of latitude `lat`.
pub(crate) fn degree_offsets(lat: f64, dist_m: f64) -> (f64, f64) {
    const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;
    let delta_lat = (dist_m / MEAN_EARTH_RADIUS).to_degrees();
    let delta_lon = delta_lat / lat.to_radians().cos();
    (delta_lat, delta_lon)
}
