use serde::{Deserialize, Serialize};

use crate::EARTH_RADIUS_KM;

/// A named disc on the Earth's surface, per spec §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

impl Zone {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, radius_km: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            radius_km,
        }
    }

    /// Whether the given point falls within this zone's radius.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        haversine_km(self.lat, self.lon, lat, lon) <= self.radius_km
    }
}

/// Great-circle distance between two lat/lon points, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1r, lat2r) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1r.cos() * lat2r.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Iterate zones in configured order and return the first whose disc contains
/// the point, per spec §4.4.1. `None` if no zone contains it (or there are no
/// zones configured).
pub fn find_zone<'a>(zones: &'a [Zone], lat: f64, lon: f64) -> Option<&'a Zone> {
    zones.iter().find(|z| z.contains(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_is_zero() {
        assert!((haversine_km(53.40, -3.00, 53.40, -3.00)).abs() < 1e-9);
    }

    #[test]
    fn harbour_zone_scenario_s5() {
        let harbour = Zone::new("harbour", 53.40, -3.00, 1.0);
        assert!(harbour.contains(53.40, -3.00));
        assert!(!harbour.contains(53.50, -3.00));
    }

    #[test]
    fn first_matching_zone_wins() {
        let zones = vec![
            Zone::new("outer", 53.40, -3.00, 50.0),
            Zone::new("harbour", 53.40, -3.00, 1.0),
        ];
        let found = find_zone(&zones, 53.40, -3.00).unwrap();
        assert_eq!(found.name, "outer");
    }

    #[test]
    fn no_zones_returns_none() {
        assert!(find_zone(&[], 53.40, -3.00).is_none());
    }
}
