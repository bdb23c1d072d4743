//! Orbit camera that frames the route on the map or the truck on the cargo
//! stage, plus scene lighting.

use std::f32::consts::{FRAC_PI_4, PI};

use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    input::mouse::MouseWheel,
    prelude::*,
};

use crate::app_state::ViewMode;
use crate::cargo::CargoStageConfig;
use crate::tracking::markers::RouteViewConfig;
use crate::tracking::ActiveRoute;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraConfig>()
            .add_systems(Startup, (setup_camera, setup_lighting))
            .add_systems(OnEnter(ViewMode::Route), frame_route)
            .add_systems(OnEnter(ViewMode::Cargo), frame_truck)
            .add_systems(
                Update,
                (
                    frame_route
                        .run_if(in_state(ViewMode::Route))
                        .run_if(resource_changed::<ActiveRoute>),
                    camera_zoom,
                    camera_rotate,
                    auto_rotate.run_if(in_state(ViewMode::Cargo)),
                    apply_orbit,
                )
                    .chain(),
            );
    }
}

#[derive(Resource, Clone, Debug)]
pub struct CameraConfig {
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Angle above the horizon when looking at the map.
    pub route_pitch: f32,
    /// Fraction of the route's span added on every side when framing it.
    pub route_padding: f64,
    /// Closest the route camera gets, for very short routes.
    pub min_route_distance: f32,
    /// Camera position relative to the truck when the cargo view opens.
    pub cargo_offset: Vec3,
    /// Turntable speed on the cargo view, radians per second.
    pub cargo_spin_speed: f32,
    /// Keyboard orbit speed, radians per second.
    pub rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: FRAC_PI_4,
            route_pitch: 55_f32.to_radians(),
            route_padding: 0.15,
            min_route_distance: 20.0,
            cargo_offset: Vec3::new(3.5, 2.5, 3.5),
            cargo_spin_speed: 0.15,
            rotate_speed: 1.0,
        }
    }
}

/// Orbit parameters of the main camera; [`apply_orbit`] derives the transform.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Rotation around +Y, radians.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 100.0,
            yaw: FRAC_PI_4,
            pitch: FRAC_PI_4,
        }
    }
}

impl OrbitCamera {
    /// Orbit that reproduces a camera placed at `target + offset`.
    pub fn from_offset(target: Vec3, offset: Vec3) -> Self {
        let horizontal = Vec2::new(offset.x, offset.z).length();
        Self {
            target,
            distance: offset.length(),
            yaw: offset.x.atan2(offset.z),
            pitch: offset.y.atan2(horizontal),
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

/// Distance at which a span of `extent` world units fits in a `fov` view.
pub fn framing_distance(extent: f32, fov: f32, margin: f32) -> f32 {
    let half_fov = (fov / 2.0).clamp(0.01, PI / 2.0 - 0.01);
    extent.max(0.0) / 2.0 / half_fov.tan() * margin.max(1.0)
}

fn setup_camera(mut commands: Commands, config: Res<CameraConfig>) {
    let orbit = OrbitCamera::default();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov,
            ..default()
        }),
        Tonemapping::TonyMcMapface,
        orbit.transform(),
        orbit,
    ));
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 12000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -FRAC_PI_4, FRAC_PI_4, 0.0)),
    ));
}

fn frame_route(
    config: Res<CameraConfig>,
    route: Res<ActiveRoute>,
    route_view: Res<RouteViewConfig>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let extent = route
        .0
        .as_ref()
        .map_or(0.0, |plan| {
            plan.bounds().padded(config.route_padding).diagonal_km() as f32 * route_view.units_per_km
        });
    let distance = framing_distance(extent, config.fov, 1.0)
        .max(config.min_route_distance);

    for mut orbit in &mut cameras {
        // The map projection is centered on the route, so the target is the origin.
        orbit.target = Vec3::ZERO;
        orbit.distance = distance;
        orbit.pitch = config.route_pitch;
    }
    debug!("Camera framing route at distance {distance:.1}");
}

fn frame_truck(
    config: Res<CameraConfig>,
    stage: Res<CargoStageConfig>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    for mut orbit in &mut cameras {
        *orbit = OrbitCamera::from_offset(stage.origin, config.cargo_offset);
    }
}

fn camera_zoom(mut cameras: Query<&mut OrbitCamera>, mut scroll_events: EventReader<MouseWheel>) {
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if scroll == 0.0 {
        return;
    }

    for mut orbit in &mut cameras {
        orbit.distance = (orbit.distance * (1.0 - scroll * 0.1)).clamp(1.0, 5000.0);
    }
}

fn camera_rotate(
    config: Res<CameraConfig>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let mut yaw = 0.0;
    let mut pitch = 0.0;
    if keys.pressed(KeyCode::KeyQ) {
        yaw -= 1.0;
    }
    if keys.pressed(KeyCode::KeyE) {
        yaw += 1.0;
    }
    if keys.pressed(KeyCode::KeyR) {
        pitch += 1.0;
    }
    if keys.pressed(KeyCode::KeyF) {
        pitch -= 1.0;
    }
    if yaw == 0.0 && pitch == 0.0 {
        return;
    }

    let step = config.rotate_speed * time.delta_secs();
    for mut orbit in &mut cameras {
        orbit.yaw += yaw * step;
        orbit.pitch = (orbit.pitch + pitch * step).clamp(0.05, 1.5);
    }
}

fn auto_rotate(config: Res<CameraConfig>, time: Res<Time>, mut cameras: Query<&mut OrbitCamera>) {
    for mut orbit in &mut cameras {
        orbit.yaw += config.cargo_spin_speed * time.delta_secs();
    }
}

fn apply_orbit(mut cameras: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut cameras {
        *transform = orbit.transform();
    }
}
