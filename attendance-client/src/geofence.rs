//! Geofence evaluation
//!
//! Great-circle distance on a spherical earth. Pure and deterministic.
//! The containment check here is an optimistic client-side gate only;
//! the backend re-validates authoritatively.

use shared::types::{Coordinates, OfficeGeofence};

/// Mean earth radius in meters (spherical approximation)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters (haversine)
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Whether `point` lies inside (or exactly on) the fence boundary
pub fn is_within(point: Coordinates, fence: &OfficeGeofence) -> bool {
    distance_meters(point, fence.center()) <= fence.radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fence(lat: f64, lon: f64, radius: f64) -> OfficeGeofence {
        OfficeGeofence {
            latitude: lat,
            longitude: lon,
            radius_meters: radius,
        }
    }

    #[test]
    fn test_same_point_is_zero_distance() {
        let p = Coordinates::new(23.8103, 90.4125);
        assert_eq!(distance_meters(p, p), 0.0);
        assert!(is_within(p, &fence(23.8103, 90.4125, 0.0)));
    }

    #[test]
    fn test_known_pair_distance() {
        // Roughly 1 degree of latitude at the equator ≈ 111.2 km
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        let d = distance_meters(a, b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_short_distance_within_office_fence() {
        // Two points ~78m apart in Dhaka
        let office = Coordinates::new(23.8103, 90.4125);
        let nearby = Coordinates::new(23.8110, 90.4125);
        let d = distance_meters(office, nearby);
        assert!(d > 70.0 && d < 85.0, "got {d}");
        assert!(is_within(nearby, &fence(23.8103, 90.4125, 100.0)));
        assert!(!is_within(nearby, &fence(23.8103, 90.4125, 50.0)));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let center = Coordinates::new(0.0, 0.0);
        let point = Coordinates::new(0.001, 0.0);
        let d = distance_meters(center, point);

        // Exactly on the boundary counts as inside
        assert!(is_within(point, &fence(0.0, 0.0, d)));
        // Epsilon past the boundary is outside
        assert!(!is_within(point, &fence(0.0, 0.0, d - 0.001)));
    }
}
