//! Route view rendering: map plane, pickup/drop pins, route line, vehicle.

use bevy::prelude::*;

use crate::app_state::ViewMode;
use crate::geo::projection::MapProjection;

use super::{ActiveRoute, ActiveShipment, MarkerPosition, VehicleMarker};

pub struct RouteViewPlugin;

impl Plugin for RouteViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RouteViewConfig>()
            .init_resource::<MapView>()
            .add_systems(Startup, setup_route_stage)
            .add_systems(
                Update,
                (
                    rebuild_route_pins,
                    attach_vehicle_marker_mesh,
                    sync_vehicle_marker,
                    draw_route.run_if(in_state(ViewMode::Route)),
                )
                    .chain(),
            );
    }
}

#[derive(Resource)]
pub struct RouteViewConfig {
    /// World units per kilometer on the map plane.
    pub units_per_km: f32,
    /// Side length of the map plane.
    pub map_size: f32,
    /// Height of pins and the vehicle above the map.
    pub marker_height: f32,
    pub dash_length: f32,
    pub gap_length: f32,
    pub route_color: Color,
    pub completed_color: Color,
    pub pickup_color: Color,
    pub drop_color: Color,
    pub vehicle_color: Color,
}

impl Default for RouteViewConfig {
    fn default() -> Self {
        Self {
            units_per_km: 10.0,
            map_size: 600.0,
            marker_height: 1.5,
            dash_length: 2.5,
            gap_length: 1.5,
            route_color: Color::srgb_u8(0xEF, 0x44, 0x44),
            completed_color: Color::srgb_u8(0x26, 0x26, 0x26),
            pickup_color: Color::srgb_u8(0x52, 0xC4, 0x1A),
            drop_color: Color::srgb_u8(0xFF, 0x4D, 0x4F),
            vehicle_color: Color::srgb_u8(0x26, 0x26, 0x26),
        }
    }
}

/// Projection used to place everything on the map plane.
#[derive(Resource, Default)]
pub struct MapView {
    pub projection: MapProjection,
}

#[derive(Component)]
struct RoutePin;

#[derive(Resource)]
struct RouteMeshes {
    pin: Handle<Mesh>,
    vehicle: Handle<Mesh>,
    vehicle_material: Handle<StandardMaterial>,
}

fn setup_route_stage(
    mut commands: Commands,
    config: Res<RouteViewConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(config.map_size, config.map_size))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.93, 0.94, 0.92),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::IDENTITY,
    ));

    commands.insert_resource(RouteMeshes {
        pin: meshes.add(Sphere::new(1.2)),
        vehicle: meshes.add(Cuboid::new(2.4, 1.2, 1.4)),
        vehicle_material: materials.add(StandardMaterial {
            base_color: config.vehicle_color,
            emissive: LinearRgba::rgb(0.4, 0.05, 0.05),
            ..default()
        }),
    });
}

fn rebuild_route_pins(
    mut commands: Commands,
    route: Res<ActiveRoute>,
    config: Res<RouteViewConfig>,
    route_meshes: Option<Res<RouteMeshes>>,
    mut map_view: ResMut<MapView>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    pins: Query<Entity, With<RoutePin>>,
) {
    if !route.is_changed() {
        return;
    }
    let Some(route_meshes) = route_meshes else {
        return;
    };

    for pin in &pins {
        commands.entity(pin).despawn_recursive();
    }

    let Some(plan) = route.0.as_ref() else {
        return;
    };

    map_view.projection = MapProjection::new(plan.bounds().center(), config.units_per_km);

    for (coordinate, color) in [(plan.pickup, config.pickup_color), (plan.drop, config.drop_color)] {
        commands.spawn((
            Mesh3d(route_meshes.pin.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                ..default()
            })),
            Transform::from_translation(
                map_view.projection.to_world_at(coordinate, config.marker_height),
            ),
            RoutePin,
        ));
    }

    debug!("Route pins rebuilt around {:?}", map_view.projection.origin);
}

fn attach_vehicle_marker_mesh(
    mut commands: Commands,
    route_meshes: Option<Res<RouteMeshes>>,
    added: Query<Entity, Added<VehicleMarker>>,
) {
    let Some(route_meshes) = route_meshes else {
        return;
    };

    for entity in &added {
        commands.entity(entity).insert((
            Mesh3d(route_meshes.vehicle.clone()),
            MeshMaterial3d(route_meshes.vehicle_material.clone()),
            Transform::default(),
            Visibility::Hidden,
        ));
    }
}

fn sync_vehicle_marker(
    time: Res<Time>,
    config: Res<RouteViewConfig>,
    map_view: Res<MapView>,
    shipment: Res<ActiveShipment>,
    mut markers: Query<(&MarkerPosition, &mut Transform, &mut Visibility), With<VehicleMarker>>,
) {
    let live = shipment.0.as_ref().is_some_and(|s| s.status.is_live());
    // Slow pulse so the marker reads as "live".
    let pulse = 1.0 + 0.12 * (time.elapsed_secs() * std::f32::consts::PI).sin();

    for (position, mut transform, mut visibility) in &mut markers {
        match position.0 {
            Some(coordinate) if live => {
                transform.translation =
                    map_view.projection.to_world_at(coordinate, config.marker_height);
                transform.scale = Vec3::splat(pulse);
                *visibility = Visibility::Visible;
            }
            _ => *visibility = Visibility::Hidden,
        }
    }
}

fn draw_route(
    route: Res<ActiveRoute>,
    config: Res<RouteViewConfig>,
    map_view: Res<MapView>,
    mut gizmos: Gizmos,
) {
    let Some(plan) = route.0.as_ref() else {
        return;
    };

    let full: Vec<Vec3> = plan
        .points
        .iter()
        .map(|p| map_view.projection.to_world_at(*p, 0.2))
        .collect();
    for (start, end) in dash_segments(&full, config.dash_length, config.gap_length) {
        gizmos.line(start, end, config.route_color);
    }

    let completed = plan.completed();
    if completed.len() >= 2 {
        gizmos.linestrip(
            completed
                .iter()
                .map(|p| map_view.projection.to_world_at(*p, 0.3)),
            config.completed_color,
        );
    }
}

/// Cut a polyline into dashes of `dash` length separated by `gap`.
pub fn dash_segments(points: &[Vec3], dash: f32, gap: f32) -> Vec<(Vec3, Vec3)> {
    let mut segments = Vec::new();
    if dash <= 0.0 {
        return segments;
    }
    let period = dash + gap.max(0.0);

    let mut travelled = 0.0;
    for window in points.windows(2) {
        let (a, b) = (window[0], window[1]);
        let length = a.distance(b);
        if length <= f32::EPSILON {
            continue;
        }
        let (s0, s1) = (travelled, travelled + length);

        let mut k = (s0 / period).floor();
        while k * period < s1 {
            let dash_start = (k * period).max(s0);
            let dash_end = (k * period + dash).min(s1);
            if dash_end > dash_start {
                segments.push((
                    a.lerp(b, (dash_start - s0) / length),
                    a.lerp(b, (dash_end - s0) / length),
                ));
            }
            k += 1.0;
        }

        travelled = s1;
    }

    segments
}
