//! Route planning for a single shipment.

use crate::geo::{
    estimate_travel_minutes, haversine_distance, interpolate_route, Coordinate, GeoBounds,
};

use super::ShipmentSnapshot;

/// Everything the route view derives from a shipment snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePlan {
    pub pickup: Coordinate,
    pub drop: Coordinate,
    pub points: Vec<Coordinate>,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub progress: u8,
}

impl RoutePlan {
    pub fn for_shipment(shipment: &ShipmentSnapshot, segments: usize, speed_kmh: f64) -> Self {
        let pickup = shipment.pickup_or_default();
        let drop = shipment.drop_or_default();
        let distance_km = haversine_distance(pickup, drop);

        Self {
            pickup,
            drop,
            points: interpolate_route(pickup, drop, segments),
            distance_km,
            eta_minutes: estimate_travel_minutes(distance_km, speed_kmh),
            progress: shipment.progress(),
        }
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds {
            south_west: Coordinate::new(self.pickup.lat.min(self.drop.lat), self.pickup.lng.min(self.drop.lng)),
            north_east: Coordinate::new(self.pickup.lat.max(self.drop.lat), self.pickup.lng.max(self.drop.lng)),
        }
    }

    /// Portion of the route already covered at the current progress.
    pub fn completed(&self) -> &[Coordinate] {
        completed_route(&self.points, self.progress)
    }
}

/// Index into a route of `len` points that sits at `progress` percent.
///
/// May equal `len` at 100 %; callers that need an element clamp it.
pub fn progress_index(progress: u8, len: usize) -> usize {
    ((f64::from(progress) / 100.0) * len as f64).floor() as usize
}

/// Prefix of `points` covered at `progress` percent.
pub fn completed_route(points: &[Coordinate], progress: u8) -> &[Coordinate] {
    let end = progress_index(progress, points.len()).min(points.len());
    &points[..end]
}
