//! Vehicle records, container geometry per vehicle type, and fleet summaries.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

use super::layout::ContainerDims;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VehicleType {
    #[default]
    Truck,
    Van,
    Pickup,
    Flatbed,
    Container,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Truck,
        VehicleType::Van,
        VehicleType::Pickup,
        VehicleType::Flatbed,
        VehicleType::Container,
    ];

    pub fn code(self) -> &'static str {
        match self {
            VehicleType::Truck => "TRUCK",
            VehicleType::Van => "VAN",
            VehicleType::Pickup => "PICKUP",
            VehicleType::Flatbed => "FLATBED",
            VehicleType::Container => "CONTAINER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Truck => "Truck",
            VehicleType::Van => "Van",
            VehicleType::Pickup => "Pickup",
            VehicleType::Flatbed => "Flatbed",
            VehicleType::Container => "Container",
        }
    }

    /// Lenient decode: unknown codes render as a truck.
    pub fn from_code(code: &str) -> VehicleType {
        code.parse().unwrap_or_default()
    }

    /// Cargo area dimensions.
    pub fn container_dims(self) -> ContainerDims {
        match self {
            VehicleType::Van => ContainerDims::new(1.4, 1.2, 2.0),
            VehicleType::Pickup => ContainerDims::new(1.3, 0.6, 1.5),
            VehicleType::Flatbed => ContainerDims::new(1.6, 0.3, 3.0),
            VehicleType::Container => ContainerDims::new(1.8, 1.8, 3.5),
            VehicleType::Truck => ContainerDims::new(1.6, 1.4, 2.5),
        }
    }

    /// Driver cab dimensions.
    pub fn cab_dims(self) -> ContainerDims {
        match self {
            VehicleType::Van => ContainerDims::new(1.4, 1.0, 0.8),
            VehicleType::Pickup => ContainerDims::new(1.3, 0.9, 0.9),
            VehicleType::Flatbed => ContainerDims::new(1.5, 1.1, 0.9),
            VehicleType::Container => ContainerDims::new(1.6, 1.2, 0.9),
            VehicleType::Truck => ContainerDims::new(1.5, 1.1, 0.9),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VehicleType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| ParseError::UnknownVehicleType(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VehicleStatus {
    #[default]
    Available,
    OnTrip,
    Maintenance,
    Inactive,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::Available,
        VehicleStatus::OnTrip,
        VehicleStatus::Maintenance,
        VehicleStatus::Inactive,
    ];

    pub fn code(self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::OnTrip => "ON_TRIP",
            VehicleStatus::Maintenance => "MAINTENANCE",
            VehicleStatus::Inactive => "INACTIVE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleStatus::Available => "Available",
            VehicleStatus::OnTrip => "On Trip",
            VehicleStatus::Maintenance => "Maintenance",
            VehicleStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VehicleStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleStatus::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| ParseError::UnknownVehicleStatus(s.to_string()))
    }
}

/// Used and total capacity of a vehicle (kg and m³).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleLoad {
    pub weight_used: f32,
    pub weight_capacity: f32,
    pub volume_used: f32,
    pub volume_capacity: f32,
}

impl VehicleLoad {
    pub fn weight_pct(&self) -> f32 {
        capped_pct(self.weight_used, self.weight_capacity)
    }

    pub fn volume_pct(&self) -> f32 {
        capped_pct(self.volume_used, self.volume_capacity)
    }

    /// Fill level shown by the cargo view; boxes represent volume.
    pub fn display_pct(&self) -> f32 {
        self.volume_pct()
    }

    pub fn remaining_weight(&self) -> f32 {
        (self.weight_capacity - self.weight_used).max(0.0)
    }

    pub fn remaining_volume(&self) -> f32 {
        (self.volume_capacity - self.volume_used).max(0.0)
    }
}

fn raw_pct(used: f32, capacity: f32) -> f32 {
    if capacity > 0.0 {
        used / capacity * 100.0
    } else {
        0.0
    }
}

/// Unknown (non-finite) loads read as empty rather than full.
fn capped_pct(used: f32, capacity: f32) -> f32 {
    let pct = raw_pct(used, capacity);
    if pct.is_finite() {
        pct.min(100.0)
    } else {
        0.0
    }
}

/// Coarse capacity band used for labels and colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityLevel {
    Low,
    Medium,
    High,
    Full,
}

impl CapacityLevel {
    pub fn from_pct(pct: f32) -> Self {
        if pct <= 25.0 {
            CapacityLevel::Low
        } else if pct <= 50.0 {
            CapacityLevel::Medium
        } else if pct <= 75.0 {
            CapacityLevel::High
        } else {
            CapacityLevel::Full
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CapacityLevel::Low => "Low",
            CapacityLevel::Medium => "Medium",
            CapacityLevel::High => "High",
            CapacityLevel::Full => "Full",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRecord {
    pub id: u32,
    pub name: String,
    pub plate_number: String,
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    pub load: VehicleLoad,
}

/// Fleet-wide utilization summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FleetStats {
    pub avg_weight_pct: u32,
    pub avg_volume_pct: u32,
    /// Vehicles above 90 % on weight or volume.
    pub overloaded: usize,
    /// Vehicles on a trip while below 20 % on both weight and volume.
    pub underutilized: usize,
    pub total: usize,
}

impl FleetStats {
    pub const OVERLOAD_PCT: f32 = 90.0;
    pub const UNDERUSE_PCT: f32 = 20.0;

    /// Averages use the uncapped ratios so an overloaded vehicle still pulls
    /// the mean up.
    pub fn from_vehicles(vehicles: &[VehicleRecord]) -> Self {
        if vehicles.is_empty() {
            return Self::default();
        }

        let mut stats = FleetStats {
            total: vehicles.len(),
            ..Default::default()
        };
        let (mut weight_sum, mut volume_sum) = (0.0_f64, 0.0_f64);

        for vehicle in vehicles {
            let wp = raw_pct(vehicle.load.weight_used, vehicle.load.weight_capacity);
            let vp = raw_pct(vehicle.load.volume_used, vehicle.load.volume_capacity);
            weight_sum += f64::from(wp);
            volume_sum += f64::from(vp);

            if wp > Self::OVERLOAD_PCT || vp > Self::OVERLOAD_PCT {
                stats.overloaded += 1;
            }
            if wp < Self::UNDERUSE_PCT
                && vp < Self::UNDERUSE_PCT
                && vehicle.status == VehicleStatus::OnTrip
            {
                stats.underutilized += 1;
            }
        }

        let n = vehicles.len() as f64;
        stats.avg_weight_pct = (weight_sum / n).round().max(0.0) as u32;
        stats.avg_volume_pct = (volume_sum / n).round().max(0.0) as u32;
        stats
    }
}
