//! Seeded demo data: a small fleet with randomized loads and a few shipments.
//!
//! There is no backend; this stands in for the records the views would
//! normally receive.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cargo::vehicle::{VehicleLoad, VehicleRecord, VehicleStatus, VehicleType};
use crate::cargo::{Fleet, SelectedVehicle};
use crate::geo::Coordinate;
use crate::shipment::{ShipmentSnapshot, ShipmentStatus};
use crate::tracking::ActiveShipment;

pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoConfig>()
            .init_resource::<ShipmentBoard>()
            .add_systems(Startup, load_demo_data);
    }
}

#[derive(Resource, Clone, Debug)]
pub struct DemoConfig {
    pub seed: u64,
    /// Total vehicles, including the fixed base fleet.
    pub fleet_size: usize,
    /// Upper bound of a random load as a fraction of capacity. Above 1.0
    /// lets some vehicles come out overloaded.
    pub max_load_factor: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 4242,
            fleet_size: 8,
            max_load_factor: 1.05,
        }
    }
}

/// Shipments available to the route view and the one being tracked.
#[derive(Resource, Default)]
pub struct ShipmentBoard {
    pub shipments: Vec<ShipmentSnapshot>,
    pub current: usize,
}

impl ShipmentBoard {
    pub fn current(&self) -> Option<&ShipmentSnapshot> {
        self.shipments.get(self.current)
    }

    pub fn current_mut(&mut self) -> Option<&mut ShipmentSnapshot> {
        self.shipments.get_mut(self.current)
    }

    /// Move to the next shipment, wrapping around.
    pub fn cycle(&mut self) -> Option<&ShipmentSnapshot> {
        if self.shipments.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.shipments.len();
        self.current()
    }
}

struct BaseVehicle {
    name: &'static str,
    plate: &'static str,
    vehicle_type: VehicleType,
    weight_capacity: f32,
    volume_capacity: f32,
}

const BASE_FLEET: [BaseVehicle; 4] = [
    BaseVehicle {
        name: "Truck-01",
        plate: "KA-01-AB-1234",
        vehicle_type: VehicleType::Truck,
        weight_capacity: 5000.0,
        volume_capacity: 25.0,
    },
    BaseVehicle {
        name: "Van-01",
        plate: "KA-01-CD-5678",
        vehicle_type: VehicleType::Van,
        weight_capacity: 1500.0,
        volume_capacity: 8.0,
    },
    BaseVehicle {
        name: "Truck-02",
        plate: "KA-02-EF-9012",
        vehicle_type: VehicleType::Truck,
        weight_capacity: 8000.0,
        volume_capacity: 40.0,
    },
    BaseVehicle {
        name: "Pickup-01",
        plate: "KA-03-GH-3456",
        vehicle_type: VehicleType::Pickup,
        weight_capacity: 800.0,
        volume_capacity: 4.0,
    },
];

/// Nominal (kg, m³) capacity for generated vehicles.
fn nominal_capacity(vehicle_type: VehicleType) -> (f32, f32) {
    match vehicle_type {
        VehicleType::Truck => (6000.0, 30.0),
        VehicleType::Van => (1500.0, 8.0),
        VehicleType::Pickup => (800.0, 4.0),
        VehicleType::Flatbed => (10000.0, 20.0),
        VehicleType::Container => (20000.0, 60.0),
    }
}

/// Build the demo fleet. The same config always yields the same fleet.
pub fn generate_fleet(config: &DemoConfig) -> Vec<VehicleRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let max_load = config.max_load_factor.max(0.0);

    let random_load = |rng: &mut StdRng, weight_capacity: f32, volume_capacity: f32| VehicleLoad {
        weight_used: (rng.gen::<f32>() * max_load * weight_capacity).round(),
        weight_capacity,
        volume_used: (rng.gen::<f32>() * max_load * volume_capacity * 10.0).round() / 10.0,
        volume_capacity,
    };

    let mut vehicles = Vec::with_capacity(config.fleet_size);
    for (i, base) in BASE_FLEET.iter().take(config.fleet_size).enumerate() {
        vehicles.push(VehicleRecord {
            id: i as u32 + 1,
            name: base.name.to_string(),
            plate_number: base.plate.to_string(),
            vehicle_type: base.vehicle_type,
            status: VehicleStatus::ALL[rng.gen_range(0..2)],
            load: random_load(&mut rng, base.weight_capacity, base.volume_capacity),
        });
    }

    while vehicles.len() < config.fleet_size {
        let id = vehicles.len() as u32 + 1;
        let vehicle_type = VehicleType::ALL[rng.gen_range(0..VehicleType::ALL.len())];
        let (weight_capacity, volume_capacity) = nominal_capacity(vehicle_type);
        vehicles.push(VehicleRecord {
            id,
            name: format!("{}-{:02}", vehicle_type.label(), id),
            plate_number: format!(
                "TS-{:02}-{}{}-{:04}",
                rng.gen_range(1..40),
                rng.gen_range(b'A'..=b'Z') as char,
                rng.gen_range(b'A'..=b'Z') as char,
                rng.gen_range(0..10000)
            ),
            vehicle_type,
            status: VehicleStatus::ALL[rng.gen_range(0..VehicleStatus::ALL.len())],
            load: random_load(&mut rng, weight_capacity, volume_capacity),
        });
    }

    vehicles
}

/// Fixed shipments around Hyderabad. One has no coordinates at all and is
/// drawn on the default pickup/drop pair.
pub fn demo_shipments() -> Vec<ShipmentSnapshot> {
    vec![
        ShipmentSnapshot {
            id: 1,
            tracking_number: "SHP-TRANSIT-042".into(),
            status: ShipmentStatus::InTransit,
            pickup: Some(Coordinate::new(17.385044, 78.486671)),
            drop: Some(Coordinate::new(17.440081, 78.348915)),
            pickup_address: "Abids, Hyderabad".into(),
            drop_address: "Gachibowli, Hyderabad".into(),
            assigned_vehicle_id: Some(1),
        },
        ShipmentSnapshot {
            id: 2,
            tracking_number: "SHP-DELAYED-999".into(),
            status: ShipmentStatus::Assigned,
            pickup: Some(Coordinate::new(17.4239, 78.4738)),
            drop: Some(Coordinate::new(17.3616, 78.4747)),
            pickup_address: "Secunderabad".into(),
            drop_address: "Charminar".into(),
            assigned_vehicle_id: Some(2),
        },
        ShipmentSnapshot {
            id: 3,
            tracking_number: "SHP-RECENT-001".into(),
            status: ShipmentStatus::Pending,
            pickup: None,
            drop: None,
            pickup_address: "123 Origin St".into(),
            drop_address: "456 Dest Rd".into(),
            assigned_vehicle_id: None,
        },
        ShipmentSnapshot {
            id: 4,
            tracking_number: "SHP-PICKED-117".into(),
            status: ShipmentStatus::PickedUp,
            pickup: Some(Coordinate::new(17.4948, 78.3996)),
            drop: Some(Coordinate::new(17.4435, 78.3772)),
            pickup_address: "Kukatpally".into(),
            drop_address: "HITEC City".into(),
            assigned_vehicle_id: Some(4),
        },
    ]
}

fn load_demo_data(
    config: Res<DemoConfig>,
    mut fleet: ResMut<Fleet>,
    mut selected: ResMut<SelectedVehicle>,
    mut board: ResMut<ShipmentBoard>,
    mut active: ResMut<ActiveShipment>,
) {
    fleet.vehicles = generate_fleet(&config);
    selected.0 = if fleet.vehicles.is_empty() { None } else { Some(0) };

    board.shipments = demo_shipments();
    board.current = 0;
    active.0 = board.current().cloned();

    info!(
        "Demo data loaded: {} vehicles, {} shipments (seed {})",
        fleet.vehicles.len(),
        board.shipments.len(),
        config.seed
    );
}
