//! Great-circle math on a spherical Earth, in nautical miles and degrees.

use crate::declination::DeclinationService;
use crate::models::Waypoint;

/// Sphere radius used for every distance in the planners.
pub const EARTH_RADIUS_KM: f64 = 6373.0;

/// Kilometres to nautical miles.
pub const KM_TO_NM: f64 = 0.539957;

/// Calculate distance between two points in nautical miles using the
/// haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    KM_TO_NM * EARTH_RADIUS_KM * c
}

/// Wrap a bearing that is at most one turn out of range into `[0, 360)`.
pub fn wrap_bearing(deg: f64) -> f64 {
    let wrapped = if deg < 0.0 {
        deg + 360.0
    } else if deg >= 360.0 {
        deg - 360.0
    } else {
        deg
    };
    // -1e-15 + 360.0 rounds to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Initial true bearing from point 1 to point 2, degrees in `[0, 360)`.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    wrap_bearing(x.atan2(y).to_degrees())
}

/// Arithmetic midpoint of two positions (average latitude and longitude).
///
/// This is not the great-circle midpoint; it matches how the planners
/// centre their search corridor and sample declination.
pub fn midpoint(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    ((lat1 + lat2) / 2.0, (lon1 + lon2) / 2.0)
}

/// Distance between two waypoints in nautical miles.
pub fn distance(a: &Waypoint, b: &Waypoint) -> f64 {
    haversine_nm(a.lat, a.lon, b.lat, b.lon)
}

/// Initial true bearing between two waypoints.
pub fn bearing(a: &Waypoint, b: &Waypoint) -> f64 {
    bearing_deg(a.lat, a.lon, b.lat, b.lon)
}

/// Magnetic bearing from `a` to `b`: true bearing minus the declination
/// at the leg midpoint at sea level.
pub fn magnetic_bearing(a: &Waypoint, b: &Waypoint, declination: &dyn DeclinationService) -> f64 {
    let (mid_lat, mid_lon) = midpoint(a.lat, a.lon, b.lat, b.lon);
    wrap_bearing(bearing(a, b) - declination.declination(mid_lat, mid_lon, 0.0))
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_nm` - Distance in nautical miles
/// * `bearing_deg` - True bearing in degrees
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_nm: f64, bearing_deg: f64) -> (f64, f64) {
    if distance_nm.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_nm / (KM_TO_NM * EARTH_RADIUS_KM);

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declination::FixedDeclination;
    use crate::models::NavaidKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        // 6373 km * pi / 180 * 0.539957
        let dist = haversine_nm(0.0, 0.0, 0.0, 1.0);
        assert!((dist - 60.06).abs() < 0.01, "got {dist}");
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_nm(33.6846, -117.8265, 33.6846, -117.8265);
        assert!(dist < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let (lat1, lon1) = (rng.random_range(-89.0..89.0), rng.random_range(-180.0..180.0));
            let (lat2, lon2) = (rng.random_range(-89.0..89.0), rng.random_range(-180.0..180.0));
            let forward = haversine_nm(lat1, lon1, lat2, lon2);
            let back = haversine_nm(lat2, lon2, lat1, lon1);
            assert!((forward - back).abs() < 1e-6);
        }
    }

    #[test]
    fn reciprocal_bearings_on_meridians_and_equator() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let lon: f64 = rng.random_range(-180.0..180.0);
            let lat1: f64 = rng.random_range(-80.0..80.0);
            let lat2: f64 = rng.random_range(-80.0..80.0);
            if (lat1 - lat2).abs() < 1e-3 {
                continue;
            }
            let fwd = bearing_deg(lat1, lon, lat2, lon);
            let back = bearing_deg(lat2, lon, lat1, lon);
            assert!((angle_diff(fwd, back) - 180.0).abs() < 1e-6);

            let lon2 = lon + rng.random_range(1.0..90.0);
            let fwd = bearing_deg(0.0, lon, 0.0, lon2);
            let back = bearing_deg(0.0, lon2, 0.0, lon);
            assert!((angle_diff(fwd, back) - 180.0).abs() < 1e-6);
        }
    }

    #[test]
    fn bearings_stay_in_range() {
        assert!((bearing_deg(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(0.0, 0.0, -1.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(0.0, 0.0, 0.0, -1.0) - 270.0).abs() < 1e-9);
        assert_eq!(wrap_bearing(-1e-15), 0.0);
        assert_eq!(wrap_bearing(365.0), 5.0);
        assert_eq!(wrap_bearing(-5.0), 355.0);
    }

    #[test]
    fn magnetic_bearing_subtracts_declination() {
        let a = Waypoint::navaid("A", "A", 0.0, 0.0, NavaidKind::Vor);
        let b = Waypoint::navaid("B", "B", 0.0, 1.0, NavaidKind::Vor);
        let east = FixedDeclination(10.0);
        let west = FixedDeclination(-10.0);
        assert!((magnetic_bearing(&a, &b, &east) - 80.0).abs() < 1e-9);
        assert!((magnetic_bearing(&a, &b, &west) - 100.0).abs() < 1e-9);

        let north = Waypoint::navaid("N", "N", 1.0, 0.0, NavaidKind::Vor);
        assert!((magnetic_bearing(&a, &north, &east) - 350.0).abs() < 1e-9);
    }

    #[test]
    fn offset_round_trips_distance_and_bearing() {
        let (lat, lon) = offset_by_bearing(45.0, 7.0, 100.0, 60.0);
        assert!((haversine_nm(45.0, 7.0, lat, lon) - 100.0).abs() < 1e-6);
        assert!((bearing_deg(45.0, 7.0, lat, lon) - 60.0).abs() < 1e-6);
    }
}
