//! Local map projection from lat/lng onto the world XZ plane.

use bevy::prelude::*;

use super::Coordinate;

/// Kilometers per degree of latitude.
const KM_PER_DEG_LAT: f64 = 110.574;
/// Kilometers per degree of longitude at the equator.
const KM_PER_DEG_LNG: f64 = 111.320;

/// Equirectangular projection centered on `origin`.
///
/// North maps to -Z and east to +X. Accurate to well under a percent for the
/// few tens of kilometers a city route spans.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapProjection {
    pub origin: Coordinate,
    /// World units per kilometer.
    pub units_per_km: f32,
}

impl MapProjection {
    pub fn new(origin: Coordinate, units_per_km: f32) -> Self {
        Self {
            origin,
            units_per_km,
        }
    }

    pub fn to_world(&self, point: Coordinate) -> Vec3 {
        self.to_world_at(point, 0.0)
    }

    /// Project `point` and lift it to `height` above the map plane.
    pub fn to_world_at(&self, point: Coordinate, height: f32) -> Vec3 {
        let east_km = (point.lng - self.origin.lng) * KM_PER_DEG_LNG * self.origin.lat.to_radians().cos();
        let north_km = (point.lat - self.origin.lat) * KM_PER_DEG_LAT;

        Vec3::new(
            east_km as f32 * self.units_per_km,
            height,
            -(north_km as f32) * self.units_per_km,
        )
    }
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::new(Coordinate::default(), 10.0)
    }
}
