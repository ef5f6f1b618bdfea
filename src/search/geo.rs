//! Geo primitives for radius filtering and distance sorting

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle (arc) distance to another point, in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Whether the point lies within `radius_km` of `center`.
    pub fn within_radius(&self, center: &GeoPoint, radius_km: f64) -> bool {
        self.distance_km(center) <= radius_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hanoi city center and Noi Bai airport, roughly 22km apart.
    const HANOI: GeoPoint = GeoPoint { lat: 21.0285, lon: 105.8542 };
    const NOI_BAI: GeoPoint = GeoPoint { lat: 21.2187, lon: 105.8047 };

    #[test]
    fn test_distance_zero_for_same_point() {
        assert!(HANOI.distance_km(&HANOI) < 1e-9);
    }

    #[test]
    fn test_distance_hanoi_noibai() {
        let d = HANOI.distance_km(&NOI_BAI);
        assert!(d > 20.0 && d < 25.0, "unexpected distance {}", d);
    }

    #[test]
    fn test_distance_symmetric() {
        let d1 = HANOI.distance_km(&NOI_BAI);
        let d2 = NOI_BAI.distance_km(&HANOI);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_within_radius() {
        assert!(NOI_BAI.within_radius(&HANOI, 30.0));
        assert!(!NOI_BAI.within_radius(&HANOI, 10.0));
    }
}
