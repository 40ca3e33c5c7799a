//! Great-circle distance and a coarse travel-time estimate.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceEngine {
    average_speed_kmh: f64,
}

impl DistanceEngine {
    pub fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }

    /// Haversine distance in kilometres. Symmetric, and zero for identical points.
    pub fn distance_km(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        haversine_km(lat1, lon1, lat2, lon2)
    }

    /// Straight-line approximation; not a routed travel time.
    pub fn travel_time_minutes(&self, distance_km: f64) -> f64 {
        if self.average_speed_kmh <= 0.0 {
            return 0.0;
        }
        (distance_km.max(0.0) / self.average_speed_kmh) * 60.0
    }
}

impl Default for DistanceEngine {
    fn default() -> Self {
        Self::new(40.0)
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` a hair outside [0, 1] for antipodal or coincident points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::{DistanceEngine, EARTH_RADIUS_KM};

    const SAMPLE_POINTS: &[(f64, f64)] = &[
        (6.5, 3.4),
        (7.4, 3.9),
        (11.85, 13.16),
        (-33.86, 151.21),
        (90.0, 0.0),
        (-90.0, 180.0),
        (0.0, -180.0),
        (51.5, -0.12),
    ];

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let engine = DistanceEngine::default();

        for &(lat_a, lon_a) in SAMPLE_POINTS {
            assert_eq!(engine.distance_km(lat_a, lon_a, lat_a, lon_a), 0.0);
            for &(lat_b, lon_b) in SAMPLE_POINTS {
                let forward = engine.distance_km(lat_a, lon_a, lat_b, lon_b);
                let backward = engine.distance_km(lat_b, lon_b, lat_a, lon_a);
                assert!((forward - backward).abs() < 1e-9, "asymmetric for {lat_a},{lon_a}");
                assert!(forward >= 0.0);
            }
        }
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let engine = DistanceEngine::default();
        let distance = engine.distance_km(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;

        assert!(distance.is_finite());
        assert!((distance - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn lagos_to_abeokuta_is_about_115_km() {
        let engine = DistanceEngine::default();
        let distance = engine.distance_km(6.5, 3.4, 7.4, 3.9);

        assert!((distance - 114.3).abs() < 2.0, "unexpected distance {distance}");
    }

    #[test]
    fn travel_time_uses_configured_average_speed() {
        assert_eq!(DistanceEngine::new(40.0).travel_time_minutes(20.0), 30.0);
        assert_eq!(DistanceEngine::new(60.0).travel_time_minutes(120.0), 120.0);
        assert_eq!(DistanceEngine::new(40.0).travel_time_minutes(0.0), 0.0);
    }
}
