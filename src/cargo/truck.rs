//! Truck model built from primitive meshes: cargo box, cab, chassis, wheels.
//!
//! Everything is positioned relative to the cargo container's center, which
//! sits at the model root's origin.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use smallvec::SmallVec;

use super::layout::ContainerDims;
use super::vehicle::VehicleType;

const WHEEL_RADIUS: f32 = 0.18;
const WHEEL_WIDTH: f32 = 0.1;
const CHASSIS_THICKNESS: f32 = 0.12;

/// Root of the spawned truck model.
#[derive(Component)]
pub struct TruckModel {
    pub vehicle_type: VehicleType,
}

/// Resolved model dimensions for one vehicle type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TruckGeometry {
    pub container: ContainerDims,
    pub cab: ContainerDims,
    pub wheel_radius: f32,
    pub wheel_width: f32,
}

impl TruckGeometry {
    pub fn for_type(vehicle_type: VehicleType) -> Self {
        Self {
            container: vehicle_type.container_dims(),
            cab: vehicle_type.cab_dims(),
            wheel_radius: WHEEL_RADIUS,
            wheel_width: WHEEL_WIDTH,
        }
    }

    /// Height of the chassis rail, just below the container floor.
    pub fn chassis_y(&self) -> f32 {
        -self.container.height / 2.0 - 0.15
    }

    pub fn chassis_size(&self) -> Vec3 {
        Vec3::new(
            self.container.width.max(self.cab.width) + 0.1,
            CHASSIS_THICKNESS,
            self.container.depth + self.cab.depth + 0.3,
        )
    }

    pub fn chassis_center(&self) -> Vec3 {
        let shift = -(self.cab.depth - self.container.depth) / 2.0 * 0.3;
        Vec3::new(0.0, self.chassis_y(), shift)
    }

    /// Cab box center; the cab sits in front (+z) of the container and shares
    /// its floor.
    pub fn cab_center(&self) -> Vec3 {
        Vec3::new(
            0.0,
            self.cab.height / 2.0 - self.container.height / 2.0,
            self.container.depth / 2.0 + self.cab.depth / 2.0 + 0.05,
        )
    }

    /// Two rear axles under the container and one front axle under the cab.
    pub fn wheel_positions(&self) -> SmallVec<[Vec3; 6]> {
        let y = self.chassis_y() - 0.04;
        let body_x = self.container.width / 2.0 + self.wheel_width / 2.0;
        let cab_x = self.cab.width / 2.0 + self.wheel_width / 2.0;
        let rear_z = self.container.depth / 2.0 - 0.3;
        let front_z = self.container.depth / 2.0 + self.cab.depth;

        let mut wheels = SmallVec::new();
        for (x, z) in [
            (body_x, rear_z),
            (body_x, -rear_z),
            (cab_x, front_z),
        ] {
            wheels.push(Vec3::new(-x, y, z));
            wheels.push(Vec3::new(x, y, z));
        }
        wheels
    }

    /// Vertical corner beams of the container frame.
    pub fn beam_positions(&self) -> [Vec3; 4] {
        let x = self.container.width / 2.0 - 0.02;
        let z = self.container.depth / 2.0 - 0.02;
        [
            Vec3::new(-x, 0.0, -z),
            Vec3::new(-x, 0.0, z),
            Vec3::new(x, 0.0, -z),
            Vec3::new(x, 0.0, z),
        ]
    }
}

/// Spawn every part of the model under `root`.
pub fn spawn_truck_parts(
    root: &mut ChildBuilder,
    geometry: &TruckGeometry,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let container = geometry.container;
    let cab = geometry.cab;

    let chassis_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x37, 0x41, 0x51),
        metallic: 0.7,
        perceptual_roughness: 0.3,
        ..default()
    });
    let cab_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x6b, 0x72, 0x80),
        metallic: 0.5,
        perceptual_roughness: 0.3,
        clearcoat: 0.6,
        ..default()
    });
    let glass_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.82, 0.84, 0.86, 0.5),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.05,
        metallic: 0.3,
        ..default()
    });
    let shell_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.80, 0.84, 0.88, 0.22),
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        perceptual_roughness: 0.1,
        ..default()
    });
    let beam_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x47, 0x55, 0x69),
        metallic: 0.8,
        perceptual_roughness: 0.2,
        ..default()
    });
    let tyre_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x1f, 0x29, 0x37),
        perceptual_roughness: 0.8,
        ..default()
    });
    let hub_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x9c, 0xa3, 0xaf),
        metallic: 0.9,
        perceptual_roughness: 0.1,
        ..default()
    });
    let headlight_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xfe, 0xf0, 0x8a),
        emissive: LinearRgba::rgb(0.8, 0.75, 0.3),
        ..default()
    });
    let taillight_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xef, 0x44, 0x44),
        emissive: LinearRgba::rgb(0.6, 0.1, 0.1),
        ..default()
    });

    // Chassis
    let chassis = geometry.chassis_size();
    root.spawn((
        Mesh3d(meshes.add(Cuboid::new(chassis.x, chassis.y, chassis.z))),
        MeshMaterial3d(chassis_material),
        Transform::from_translation(geometry.chassis_center()),
    ));

    // Cab with windshield and headlights
    let cab_center = geometry.cab_center();
    root.spawn((
        Mesh3d(meshes.add(Cuboid::new(cab.width, cab.height, cab.depth))),
        MeshMaterial3d(cab_material),
        Transform::from_translation(cab_center),
    ));
    let cab_front = cab_center.z + cab.depth / 2.0;
    let cab_floor = -container.height / 2.0;
    root.spawn((
        Mesh3d(meshes.add(Cuboid::new(cab.width * 0.7, cab.height * 0.45, 0.01))),
        MeshMaterial3d(glass_material),
        Transform::from_xyz(0.0, cab_floor + cab.height * 0.35, cab_front),
    ));
    let headlight = meshes.add(Cylinder::new(0.08, 0.01));
    for side in [-1.0, 1.0] {
        root.spawn((
            Mesh3d(headlight.clone()),
            MeshMaterial3d(headlight_material.clone()),
            Transform::from_xyz(
                side * (cab.width / 2.0 - 0.15),
                cab_floor + cab.height * 0.15,
                cab_front + 0.01,
            )
            .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        ));
    }

    // Translucent container shell and corner beams
    root.spawn((
        Mesh3d(meshes.add(Cuboid::new(container.width, container.height, container.depth))),
        MeshMaterial3d(shell_material),
        Transform::IDENTITY,
    ));
    let beam = meshes.add(Cuboid::new(0.04, container.height, 0.04));
    for position in geometry.beam_positions() {
        root.spawn((
            Mesh3d(beam.clone()),
            MeshMaterial3d(beam_material.clone()),
            Transform::from_translation(position),
        ));
    }

    // Wheels, axis along x
    let tyre = meshes.add(Cylinder::new(geometry.wheel_radius, geometry.wheel_width));
    let hub = meshes.add(Cylinder::new(geometry.wheel_radius * 0.4, 0.01));
    for position in geometry.wheel_positions() {
        root.spawn((
            Mesh3d(tyre.clone()),
            MeshMaterial3d(tyre_material.clone()),
            Transform::from_translation(position)
                .with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
        ))
        .with_children(|wheel| {
            wheel.spawn((
                Mesh3d(hub.clone()),
                MeshMaterial3d(hub_material.clone()),
                Transform::from_xyz(0.0, geometry.wheel_width / 2.0 + 0.005, 0.0),
            ));
        });
    }

    // Tail lights
    let taillight = meshes.add(Cuboid::new(0.12, 0.08, 0.01));
    for side in [-1.0, 1.0] {
        root.spawn((
            Mesh3d(taillight.clone()),
            MeshMaterial3d(taillight_material.clone()),
            Transform::from_xyz(
                side * (container.width / 2.0 - 0.1),
                cab_floor + 0.15,
                -container.depth / 2.0 - 0.01,
            ),
        ));
    }
}
