//! Great-circle radius search over candidate sets.
//!
//! There is no persistent spatial index; the data store pre-filters candidates
//! (non-null coordinates, active flags) and the search runs per request over
//! that small set.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Haversine distance between two points, in kilometers.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Filters `candidates` to those within `radius_km` of `origin` (inclusive)
/// and returns them paired with their distance, sorted nearest first.
///
/// Candidates without coordinates must be excluded before calling; `coords_of`
/// is expected to be total over the supplied set.
pub fn nearby<T, F>(origin: Coordinates, candidates: Vec<T>, radius_km: f64, coords_of: F) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Coordinates,
{
    let mut hits: Vec<(T, f64)> = candidates
        .into_iter()
        .filter_map(|c| {
            let d = haversine_km(origin, coords_of(&c));
            (d <= radius_km).then_some((c, d))
        })
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOGOTA: Coordinates = Coordinates { lat: 4.711, lon: -74.072 };

    /// Degrees of latitude spanning `km` kilometers on the 6371 km sphere.
    fn lat_degrees_for_km(km: f64) -> f64 {
        km / EARTH_RADIUS_KM * 180.0 / std::f64::consts::PI
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(haversine_km(BOGOTA, BOGOTA), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let other = Coordinates::new(4.72, -74.08);
        let ab = haversine_km(BOGOTA, other);
        let ba = haversine_km(other, BOGOTA);
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_known_distance_bogota_medellin() {
        // Bogota to Medellin is roughly 245 km as the crow flies.
        let medellin = Coordinates::new(6.2442, -75.5812);
        let d = haversine_km(BOGOTA, medellin);
        assert!((240.0..255.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_candidate_exactly_on_radius_included() {
        let on_edge = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(1.0), BOGOTA.lon);
        let hits = nearby(BOGOTA, vec![on_edge], 1.0, |c| *c);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_one_meter_beyond_excluded() {
        let beyond = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(1.001), BOGOTA.lon);
        let hits = nearby(BOGOTA, vec![beyond], 1.0, |c| *c);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_candidate_on_origin_included_at_distance_zero() {
        let hits = nearby(BOGOTA, vec![BOGOTA], 1.0, |c| *c);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn test_results_sorted_nearest_first() {
        let far = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(0.9), BOGOTA.lon);
        let near = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(0.2), BOGOTA.lon);
        let mid = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(0.5), BOGOTA.lon);
        let hits = nearby(BOGOTA, vec![far, near, mid], 1.0, |c| *c);
        assert_eq!(hits.len(), 3);
        assert!(hits[0].1 < hits[1].1 && hits[1].1 < hits[2].1);
    }

    #[test]
    fn test_out_of_radius_filtered() {
        let inside = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(0.5), BOGOTA.lon);
        let outside = Coordinates::new(BOGOTA.lat + lat_degrees_for_km(3.0), BOGOTA.lon);
        let hits = nearby(BOGOTA, vec![outside, inside], 1.0, |c| *c);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].1 - 0.5).abs() < 1e-6);
    }
}
