//! Geographic math for shipment routes.
//!
//! Distances use the haversine formula on a spherical Earth. Routes are
//! straight lines in lat/lng space: close enough for urban legs, but they drift
//! away from the true great circle (and from any real road) on long hauls.

pub mod projection;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Number of segments a shipment route is split into.
pub const DEFAULT_ROUTE_POINTS: usize = 50;

/// Average urban driving speed used for arrival estimates.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;

/// A geographic point in decimal degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Linear blend in lat/lng space. Exact at `t = 0` and `t = 1`.
    pub fn lerp(self, other: Coordinate, t: f64) -> Coordinate {
        Coordinate {
            lat: self.lat * (1.0 - t) + other.lat * t,
            lng: self.lng * (1.0 - t) + other.lng * t,
        }
    }
}

/// Great-circle distance between two points in kilometers.
///
/// NaN in either input propagates to the result.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Split the straight line from `start` to `end` into `num_points` segments.
///
/// Returns `num_points + 1` coordinates, both endpoints included. With zero
/// segments the route degenerates to the start point alone.
pub fn interpolate_route(start: Coordinate, end: Coordinate, num_points: usize) -> Vec<Coordinate> {
    if num_points == 0 {
        return vec![start];
    }

    (0..=num_points)
        .map(|i| start.lerp(end, i as f64 / num_points as f64))
        .collect()
}

/// Whole minutes needed to cover `distance_km` at `speed_kmh`.
pub fn estimate_travel_minutes(distance_km: f64, speed_kmh: f64) -> u32 {
    if speed_kmh <= 0.0 || !distance_km.is_finite() {
        return 0;
    }
    // Negative distances saturate to zero in the cast.
    (distance_km / speed_kmh * 60.0).round() as u32
}

/// Axis-aligned lat/lng box around a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl GeoBounds {
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;

        let bounds = iter.fold(
            GeoBounds {
                south_west: first,
                north_east: first,
            },
            |mut acc, p| {
                acc.south_west.lat = acc.south_west.lat.min(p.lat);
                acc.south_west.lng = acc.south_west.lng.min(p.lng);
                acc.north_east.lat = acc.north_east.lat.max(p.lat);
                acc.north_east.lng = acc.north_east.lng.max(p.lng);
                acc
            },
        );

        Some(bounds)
    }

    pub fn center(&self) -> Coordinate {
        self.south_west.lerp(self.north_east, 0.5)
    }

    /// Grow the box by `fraction` of its span on every side.
    pub fn padded(&self, fraction: f64) -> GeoBounds {
        let pad_lat = (self.north_east.lat - self.south_west.lat) * fraction;
        let pad_lng = (self.north_east.lng - self.south_west.lng) * fraction;
        GeoBounds {
            south_west: Coordinate::new(self.south_west.lat - pad_lat, self.south_west.lng - pad_lng),
            north_east: Coordinate::new(self.north_east.lat + pad_lat, self.north_east.lng + pad_lng),
        }
    }

    /// Length of the diagonal in kilometers.
    pub fn diagonal_km(&self) -> f64 {
        haversine_distance(self.south_west, self.north_east)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PICKUP: Coordinate = Coordinate::new(17.385044, 78.486671);
    const DROP: Coordinate = Coordinate::new(17.440081, 78.348915);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance(PICKUP, PICKUP), 0.0);
        assert_eq!(haversine_distance(DROP, DROP), 0.0);
        assert_eq!(haversine_distance(Coordinate::default(), Coordinate::default()), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_distance(PICKUP, DROP);
        let back = haversine_distance(DROP, PICKUP);
        assert!((there - back).abs() < 1e-9);

        let far_a = Coordinate::new(-33.8688, 151.2093);
        let far_b = Coordinate::new(51.5074, -0.1278);
        assert!((haversine_distance(far_a, far_b) - haversine_distance(far_b, far_a)).abs() < 1e-9);
    }

    #[test]
    fn hyderabad_leg_matches_formula() {
        // Evaluated independently: ~15.845 km.
        let d = haversine_distance(PICKUP, DROP);
        assert!((d - 15.845).abs() < 0.01, "got {d}");
    }

    #[test]
    fn known_long_distance() {
        // Las Vegas to Los Angeles, roughly 370 km.
        let d = haversine_distance(Coordinate::new(36.17, -115.14), Coordinate::new(34.05, -118.24));
        assert!(d > 350.0 && d < 400.0, "got {d}");
    }

    #[test]
    fn nan_propagates() {
        let d = haversine_distance(Coordinate::new(f64::NAN, 0.0), PICKUP);
        assert!(d.is_nan());
    }

    #[test]
    fn route_has_endpoints_and_length() {
        let route = interpolate_route(PICKUP, DROP, DEFAULT_ROUTE_POINTS);
        assert_eq!(route.len(), 51);
        assert_eq!(route[0], PICKUP);
        assert_eq!(route[50], DROP);

        let short = interpolate_route(PICKUP, DROP, 3);
        assert_eq!(short.len(), 4);
        assert_eq!(short[3], DROP);
    }

    #[test]
    fn route_is_evenly_spaced() {
        let route = interpolate_route(Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 20.0), 10);
        for (i, p) in route.iter().enumerate() {
            assert!((p.lat - i as f64).abs() < 1e-12);
            assert!((p.lng - 2.0 * i as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_segment_route_is_start_only() {
        assert_eq!(interpolate_route(PICKUP, DROP, 0), vec![PICKUP]);
    }

    #[test]
    fn route_is_deterministic() {
        assert_eq!(interpolate_route(PICKUP, DROP, 50), interpolate_route(PICKUP, DROP, 50));
    }

    #[test]
    fn travel_minutes() {
        assert_eq!(estimate_travel_minutes(14.9, DEFAULT_AVERAGE_SPEED_KMH), 30);
        assert_eq!(estimate_travel_minutes(15.845, 30.0), 32);
        assert_eq!(estimate_travel_minutes(10.0, 0.0), 0);
        assert_eq!(estimate_travel_minutes(f64::NAN, 30.0), 0);
        assert_eq!(estimate_travel_minutes(-3.0, 30.0), 0);
    }

    #[test]
    fn bounds_cover_points() {
        let bounds = GeoBounds::from_points([PICKUP, DROP]).unwrap();
        assert_eq!(bounds.south_west, Coordinate::new(PICKUP.lat, DROP.lng));
        assert_eq!(bounds.north_east, Coordinate::new(DROP.lat, PICKUP.lng));

        let padded = bounds.padded(0.1);
        assert!(padded.south_west.lat < bounds.south_west.lat);
        assert!(padded.north_east.lng > bounds.north_east.lng);
        assert!(padded.diagonal_km() > bounds.diagonal_km());

        assert!(GeoBounds::from_points(std::iter::empty()).is_none());
    }
}
