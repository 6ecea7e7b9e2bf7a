//! Location helpers: coordinate parsing and great-circle distance

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mean Earth radius used by the Haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in kilometres
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_km(self, other)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lng)
    }
}

impl FromStr for Coordinates {
    type Err = String;

    /// Parses `"lat,lng"`, e.g. `"51.5074,-0.1278"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got '{}'", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;

        let coords = Coordinates::new(lat, lng);
        if !coords.is_valid() {
            return Err(format!("coordinates out of range: {}", s.trim()));
        }
        Ok(coords)
    }
}

/// Haversine distance between two points, in kilometres
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human-readable distance: metres below 1 km, one decimal above
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as u64)
    } else {
        format!("{:.1} km", km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng_pairs() {
        let c: Coordinates = " 51.5074, -0.1278 ".parse().unwrap();
        assert_eq!(c, Coordinates::new(51.5074, -0.1278));

        assert!("51.5".parse::<Coordinates>().is_err());
        assert!("north,west".parse::<Coordinates>().is_err());
        assert!("91,0".parse::<Coordinates>().is_err());
        assert!("0,-181".parse::<Coordinates>().is_err());
    }

    #[test]
    fn same_point_is_zero_distance() {
        let p = Coordinates::new(40.7128, -74.006);
        assert!(haversine_km(&p, &p).abs() < 1e-9);
    }

    #[test]
    fn london_to_paris() {
        let london = Coordinates::new(51.5074, -0.1278);
        let paris = Coordinates::new(48.8566, 2.3522);
        let d = london.distance_to(&paris);
        assert!((d - 343.5).abs() < 1.0, "got {}", d);
        assert!((d - paris.distance_to(&london)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        assert!((haversine_km(&a, &b) - 111.19).abs() < 0.1);
    }

    #[test]
    fn distance_labels() {
        assert_eq!(format_distance(0.85), "850 m");
        assert_eq!(format_distance(3.24), "3.2 km");
        assert_eq!(format_distance(12.0), "12.0 km");
    }
}
