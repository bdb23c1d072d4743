//! Cargo capacity view: a truck model filled with boxes by volume usage.

use bevy::prelude::*;

use crate::app_state::ViewMode;

pub mod layout;
pub mod truck;
pub mod vehicle;

use layout::{generate_layout, CargoBoxPlacement, CargoLayoutConfig, ContainerDims, CARDBOARD_COLORS, TAPE_COLORS};
use truck::{spawn_truck_parts, TruckGeometry, TruckModel};
use vehicle::{FleetStats, VehicleRecord, VehicleStatus, VehicleType};

pub struct CargoPlugin;

impl Plugin for CargoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CargoLayoutConfig>()
            .init_resource::<CargoStageConfig>()
            .init_resource::<Fleet>()
            .init_resource::<SelectedVehicle>()
            .init_resource::<VehicleFilter>()
            .init_resource::<CargoLayoutCache>()
            .add_systems(Startup, setup_cargo_stage)
            .add_systems(
                Update,
                (
                    rebuild_truck_model,
                    rebuild_cargo_boxes,
                    sway_truck.run_if(in_state(ViewMode::Cargo)),
                )
                    .chain(),
            );
    }
}

/// Where and how the truck is shown.
#[derive(Resource, Clone, Debug)]
pub struct CargoStageConfig {
    /// World position of the container center. Far from the map so the two
    /// views never overlap.
    pub origin: Vec3,
    /// Sway frequency in radians per second.
    pub sway_speed: f32,
    /// Peak yaw of the sway, in radians.
    pub sway_amplitude: f32,
}

impl Default for CargoStageConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(1000.0, 1.12, 0.0),
            sway_speed: 0.3,
            sway_amplitude: 0.04,
        }
    }
}

/// Vehicles known to the app.
#[derive(Resource, Default)]
pub struct Fleet {
    pub vehicles: Vec<VehicleRecord>,
}

impl Fleet {
    pub fn stats(&self) -> FleetStats {
        FleetStats::from_vehicles(&self.vehicles)
    }

    pub fn find(&self, id: u32) -> Option<&VehicleRecord> {
        self.vehicles.iter().find(|v| v.id == id)
    }
}

/// Index into [`Fleet::vehicles`] of the vehicle on the cargo view.
#[derive(Resource, Default)]
pub struct SelectedVehicle(pub Option<usize>);

impl SelectedVehicle {
    pub fn get<'a>(&self, fleet: &'a Fleet) -> Option<&'a VehicleRecord> {
        self.0.and_then(|index| fleet.vehicles.get(index))
    }

    /// Select the next vehicle passing `filter`, wrapping around. Clears the
    /// selection when nothing passes.
    pub fn cycle(&mut self, fleet: &Fleet, filter: &VehicleFilter) {
        let len = fleet.vehicles.len();
        let start = self.0.map_or(0, |index| index + 1);
        self.0 = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&index| filter.matches(&fleet.vehicles[index]));
    }

    /// Move off a vehicle the filter no longer shows.
    pub fn ensure_visible(&mut self, fleet: &Fleet, filter: &VehicleFilter) {
        if !self.get(fleet).is_some_and(|v| filter.matches(v)) {
            self.cycle(fleet, filter);
        }
    }
}

/// Which vehicles the cargo view cycles through. `None` means any.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    pub vehicle_type: Option<VehicleType>,
    pub status: Option<VehicleStatus>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &VehicleRecord) -> bool {
        self.vehicle_type.map_or(true, |t| t == vehicle.vehicle_type)
            && self.status.map_or(true, |s| s == vehicle.status)
    }

    /// Any, then each type in turn, then back to any.
    pub fn cycle_type(&mut self) {
        self.vehicle_type = next_option(self.vehicle_type, &VehicleType::ALL);
    }

    pub fn cycle_status(&mut self) {
        self.status = next_option(self.status, &VehicleStatus::ALL);
    }

    pub fn label(&self) -> String {
        format!(
            "{} / {}",
            self.vehicle_type.map_or("All types", VehicleType::label),
            self.status.map_or("All statuses", VehicleStatus::label)
        )
    }
}

fn next_option<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|&v| v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

/// Inputs that fully determine a layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutKey {
    pub fill_pct: f32,
    pub dims: ContainerDims,
}

/// Last generated layout; regenerated only when its key changes.
#[derive(Resource, Default)]
pub struct CargoLayoutCache {
    key: Option<LayoutKey>,
    boxes: Vec<CargoBoxPlacement>,
    generations: u32,
}

impl CargoLayoutCache {
    /// Returns true when the layout was regenerated.
    pub fn refresh(&mut self, key: Option<LayoutKey>, config: &CargoLayoutConfig) -> bool {
        if self.key == key {
            return false;
        }
        self.boxes = match key {
            Some(k) => generate_layout(k.fill_pct, k.dims, config),
            None => Vec::new(),
        };
        self.key = key;
        self.generations += 1;
        true
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.boxes.clear();
    }

    pub fn boxes(&self) -> &[CargoBoxPlacement] {
        &self.boxes
    }

    pub fn generations(&self) -> u32 {
        self.generations
    }
}

#[derive(Component)]
struct CargoBox;

#[derive(Resource)]
struct CargoMeshes {
    unit_cube: Handle<Mesh>,
    cardboard: Vec<Handle<StandardMaterial>>,
    tape: Vec<Handle<StandardMaterial>>,
}

fn setup_cargo_stage(
    mut commands: Commands,
    config: Res<CargoStageConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(12.0, 12.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0xf9, 0xfa, 0xfb),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_translation(config.origin - Vec3::Y * 1.12),
    ));

    let cardboard = CARDBOARD_COLORS
        .iter()
        .map(|&color| {
            materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: 0.85,
                metallic: 0.02,
                ..default()
            })
        })
        .collect();
    let tape = TAPE_COLORS
        .iter()
        .map(|&color| {
            materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: 0.4,
                ..default()
            })
        })
        .collect();

    commands.insert_resource(CargoMeshes {
        unit_cube: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        cardboard,
        tape,
    });
}

/// Respawn the truck when the selected vehicle's type changes.
fn rebuild_truck_model(
    mut commands: Commands,
    fleet: Res<Fleet>,
    selected: Res<SelectedVehicle>,
    stage: Res<CargoStageConfig>,
    mut cache: ResMut<CargoLayoutCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    models: Query<(Entity, &TruckModel)>,
) {
    if !fleet.is_changed() && !selected.is_changed() {
        return;
    }

    let wanted: Option<VehicleType> = selected.get(&fleet).map(|v| v.vehicle_type);
    let current = models.iter().next().map(|(_, model)| model.vehicle_type);
    if wanted == current {
        return;
    }

    for (entity, _) in &models {
        commands.entity(entity).despawn_recursive();
    }
    // Boxes lived under the old model.
    cache.invalidate();

    let Some(vehicle_type) = wanted else {
        return;
    };

    let geometry = TruckGeometry::for_type(vehicle_type);
    commands
        .spawn((
            TruckModel { vehicle_type },
            Transform::from_translation(stage.origin),
            Visibility::default(),
        ))
        .with_children(|root| {
            spawn_truck_parts(root, &geometry, &mut meshes, &mut materials);
        });

    info!("Truck model rebuilt for {}", vehicle_type.label());
}

fn rebuild_cargo_boxes(
    mut commands: Commands,
    fleet: Res<Fleet>,
    selected: Res<SelectedVehicle>,
    config: Res<CargoLayoutConfig>,
    cargo_meshes: Option<Res<CargoMeshes>>,
    mut cache: ResMut<CargoLayoutCache>,
    models: Query<Entity, With<TruckModel>>,
    boxes: Query<Entity, With<CargoBox>>,
) {
    let Some(cargo_meshes) = cargo_meshes else {
        return;
    };
    if config.is_changed() {
        cache.invalidate();
    }

    let key = selected.get(&fleet).map(|vehicle| LayoutKey {
        fill_pct: vehicle.load.display_pct(),
        dims: vehicle.vehicle_type.container_dims(),
    });
    if !cache.refresh(key, &config) {
        return;
    }

    for entity in &boxes {
        commands.entity(entity).despawn_recursive();
    }

    let Ok(root) = models.get_single() else {
        return;
    };

    commands.entity(root).with_children(|parent| {
        for placement in cache.boxes() {
            spawn_cargo_box(parent, &cargo_meshes, placement);
        }
    });

    info!(
        "Cargo layout regenerated: {} boxes at {:.0}%",
        cache.boxes().len(),
        key.map_or(0.0, |k| k.fill_pct)
    );
}

fn spawn_cargo_box(parent: &mut ChildBuilder, cargo_meshes: &CargoMeshes, placement: &CargoBoxPlacement) {
    let size = placement.size;
    let cardboard = &cargo_meshes.cardboard[placement.color_index % cargo_meshes.cardboard.len()];
    let tape = &cargo_meshes.tape[placement.color_index % cargo_meshes.tape.len()];

    parent.spawn((
        Mesh3d(cargo_meshes.unit_cube.clone()),
        MeshMaterial3d(cardboard.clone()),
        Transform::from_translation(placement.position).with_scale(size),
        CargoBox,
    ));

    // Tape strips across the top and down the front.
    parent.spawn((
        Mesh3d(cargo_meshes.unit_cube.clone()),
        MeshMaterial3d(tape.clone()),
        Transform::from_translation(placement.position + Vec3::Y * (size.y / 2.0 + 0.002))
            .with_scale(Vec3::new(size.x * 0.25, 0.004, size.z * 0.95)),
        CargoBox,
    ));
    parent.spawn((
        Mesh3d(cargo_meshes.unit_cube.clone()),
        MeshMaterial3d(tape.clone()),
        Transform::from_translation(placement.position + Vec3::Z * (size.z / 2.0 + 0.002))
            .with_scale(Vec3::new(size.x * 0.25, size.y * 0.95, 0.004)),
        CargoBox,
    ));
}

fn sway_truck(
    time: Res<Time>,
    stage: Res<CargoStageConfig>,
    mut models: Query<&mut Transform, With<TruckModel>>,
) {
    let yaw = (time.elapsed_secs() * stage.sway_speed).sin() * stage.sway_amplitude;
    for mut transform in &mut models {
        transform.rotation = Quat::from_rotation_y(yaw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;

    use super::vehicle::{VehicleLoad, VehicleStatus};

    fn record(id: u32, vehicle_type: VehicleType, volume_used: f32) -> VehicleRecord {
        VehicleRecord {
            id,
            name: format!("V{id}"),
            plate_number: String::new(),
            vehicle_type,
            status: VehicleStatus::OnTrip,
            load: VehicleLoad {
                weight_used: 100.0,
                weight_capacity: 1000.0,
                volume_used,
                volume_capacity: 10.0,
            },
        }
    }

    fn test_app(fleet: Vec<VehicleRecord>) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), bevy::state::app::StatesPlugin))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_state::<ViewMode>()
            .add_plugins(CargoPlugin);
        app.insert_resource(Fleet { vehicles: fleet });
        app.insert_resource(SelectedVehicle(Some(0)));
        app.update();
        app
    }

    fn box_count(app: &mut App) -> usize {
        let mut query = app.world_mut().query_filtered::<Entity, With<CargoBox>>();
        query.iter(app.world()).count()
    }

    #[test]
    fn cache_only_regenerates_on_key_change() {
        let config = CargoLayoutConfig::default();
        let mut cache = CargoLayoutCache::default();
        let key = Some(LayoutKey {
            fill_pct: 50.0,
            dims: VehicleType::Truck.container_dims(),
        });

        assert!(cache.refresh(key, &config));
        assert_eq!(cache.boxes().len(), 40);
        assert!(!cache.refresh(key, &config));
        assert_eq!(cache.generations(), 1);

        let van = Some(LayoutKey {
            fill_pct: 50.0,
            dims: VehicleType::Van.container_dims(),
        });
        assert!(cache.refresh(van, &config));
        assert_eq!(cache.boxes().len(), 18);

        assert!(cache.refresh(None, &config));
        assert!(cache.boxes().is_empty());
    }

    #[test]
    fn selection_cycles_and_wraps() {
        let fleet = Fleet {
            vehicles: vec![
                record(1, VehicleType::Truck, 5.0),
                record(2, VehicleType::Van, 5.0),
                record(3, VehicleType::Truck, 5.0),
            ],
        };
        let any = VehicleFilter::default();
        let mut selected = SelectedVehicle::default();
        selected.cycle(&fleet, &any);
        assert_eq!(selected.0, Some(0));
        selected.cycle(&fleet, &any);
        selected.cycle(&fleet, &any);
        selected.cycle(&fleet, &any);
        assert_eq!(selected.0, Some(0));
        selected.cycle(&Fleet::default(), &any);
        assert_eq!(selected.0, None);
    }

    #[test]
    fn selection_skips_filtered_vehicles() {
        let mut fleet = Fleet {
            vehicles: vec![
                record(1, VehicleType::Truck, 5.0),
                record(2, VehicleType::Van, 5.0),
                record(3, VehicleType::Truck, 5.0),
            ],
        };
        let trucks = VehicleFilter {
            vehicle_type: Some(VehicleType::Truck),
            status: None,
        };
        let mut selected = SelectedVehicle(Some(0));
        selected.cycle(&fleet, &trucks);
        assert_eq!(selected.0, Some(2));
        selected.cycle(&fleet, &trucks);
        assert_eq!(selected.0, Some(0));

        // The van is hidden, so the selection moves to the next truck.
        let mut on_van = SelectedVehicle(Some(1));
        on_van.ensure_visible(&fleet, &trucks);
        assert_eq!(on_van.0, Some(2));

        fleet.vehicles[0].status = VehicleStatus::Maintenance;
        let in_maintenance = VehicleFilter {
            vehicle_type: None,
            status: Some(VehicleStatus::Maintenance),
        };
        selected.ensure_visible(&fleet, &in_maintenance);
        assert_eq!(selected.0, Some(0));
        selected.cycle(&fleet, &in_maintenance);
        assert_eq!(selected.0, Some(0));

        let flatbeds = VehicleFilter {
            vehicle_type: Some(VehicleType::Flatbed),
            status: None,
        };
        selected.cycle(&fleet, &flatbeds);
        assert_eq!(selected.0, None);
    }

    #[test]
    fn filter_options_cycle_back_to_any() {
        let mut filter = VehicleFilter::default();
        assert_eq!(filter.label(), "All types / All statuses");
        for expected in VehicleType::ALL {
            filter.cycle_type();
            assert_eq!(filter.vehicle_type, Some(expected));
        }
        filter.cycle_type();
        assert_eq!(filter.vehicle_type, None);

        filter.cycle_status();
        assert_eq!(filter.status, Some(VehicleStatus::Available));
        assert_eq!(filter.label(), "All types / Available");
    }

    #[test]
    fn spawns_boxes_for_selected_vehicle() {
        // 5 of 10 m³ on an 80-slot truck; each box has two tape strips.
        let mut app = test_app(vec![record(1, VehicleType::Truck, 5.0)]);
        assert_eq!(box_count(&mut app), 40 * 3);

        let mut models = app.world_mut().query::<&TruckModel>();
        assert_eq!(models.single(app.world()).vehicle_type, VehicleType::Truck);
    }

    #[test]
    fn same_fill_on_same_type_keeps_layout() {
        let mut app = test_app(vec![
            record(1, VehicleType::Truck, 5.0),
            record(2, VehicleType::Truck, 5.0),
            record(3, VehicleType::Pickup, 10.0),
        ]);
        assert_eq!(app.world().resource::<CargoLayoutCache>().generations(), 1);

        app.world_mut().resource_mut::<SelectedVehicle>().0 = Some(1);
        app.update();
        assert_eq!(app.world().resource::<CargoLayoutCache>().generations(), 1);
        assert_eq!(box_count(&mut app), 40 * 3);

        app.world_mut().resource_mut::<SelectedVehicle>().0 = Some(2);
        app.update();
        assert_eq!(app.world().resource::<CargoLayoutCache>().generations(), 2);
        assert_eq!(box_count(&mut app), 18 * 3);
    }
}
