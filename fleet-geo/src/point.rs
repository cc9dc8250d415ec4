use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair, longitude first (GeoJSON order).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = GeoPoint::new(36.8219, -1.2921);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn nairobi_cbd_to_westlands_is_about_four_km() {
        let cbd = GeoPoint::new(36.8219, -1.2921);
        let westlands = GeoPoint::new(36.8090, -1.2635);
        let d = haversine_km(cbd, westlands);
        assert!(d > 3.0 && d < 4.5, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(36.8219, -1.2921);
        let b = GeoPoint::new(39.6682, -4.0435);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
