//! Geodesic distance between positional fixes.

use contracts::PositionalFix;

/// Mean Earth radius (meters)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two fixes (meters)
///
/// Altitude is ignored; at bicycle scales the horizontal component
/// dominates.
pub fn haversine_distance(a: &PositionalFix, b: &PositionalFix) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(latitude: f64, longitude: f64) -> PositionalFix {
        PositionalFix {
            timestamp: 0.0,
            latitude,
            longitude,
            altitude: 0.0,
            speed: 0.0,
            course: 0.0,
            horizontal_accuracy: 5.0,
            vertical_accuracy: 5.0,
        }
    }

    #[test]
    fn test_zero_distance() {
        let a = fix(48.8584, 2.2945);
        assert!(haversine_distance(&a, &a).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_latitude() {
        // One degree of latitude is ~111.2 km
        let a = fix(47.0, 8.0);
        let b = fix(48.0, 8.0);
        let d = haversine_distance(&a, &b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_short_hop() {
        // ~50 m north of the start point
        let a = fix(47.0, 8.0);
        let b = fix(47.0 + 50.0 / 111_195.0, 8.0);
        let d = haversine_distance(&a, &b);
        assert!((d - 50.0).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_symmetry() {
        let a = fix(47.37, 8.54);
        let b = fix(47.38, 8.55);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert!((ab - ba).abs() < 1e-9);
    }
}
