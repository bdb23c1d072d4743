//! On-screen panel, help line and keyboard controls.

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::app_state::ViewMode;
use crate::cargo::{Fleet, SelectedVehicle, VehicleFilter};
use crate::demo::ShipmentBoard;
use crate::tracking::ActiveShipment;

pub mod panel;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(panel::InfoPanelPlugin)
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(Startup, setup_help_line)
            .add_systems(
                Update,
                (
                    toggle_view,
                    shipment_controls,
                    vehicle_controls,
                    update_fps_counter,
                ),
            );
    }
}

/// Marker for the FPS text entity.
#[derive(Component)]
struct FpsText;

const HELP: &str =
    "Tab view  N shipment  S advance status  V vehicle  T/O filter type/status  Q/E orbit  R/F tilt  scroll zoom";

fn setup_help_line(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(8.0),
                left: Val::Px(10.0),
                right: Val::Px(10.0),
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
        ))
        .with_children(|bar| {
            bar.spawn((
                Text::new(HELP),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.35, 0.35, 0.38)),
            ));
            bar.spawn((
                Text::new("FPS: --"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.35, 0.35, 0.38)),
                FpsText,
            ));
        });
}

fn update_fps_counter(diagnostics: Res<DiagnosticsStore>, mut query: Query<&mut Text, With<FpsText>>) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
        {
            **text = format!("FPS: {fps:.0}");
        }
    }
}

fn toggle_view(
    keys: Res<ButtonInput<KeyCode>>,
    mode: Res<State<ViewMode>>,
    mut next: ResMut<NextState<ViewMode>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(mode.get().toggled());
    }
}

fn shipment_controls(
    keys: Res<ButtonInput<KeyCode>>,
    mut board: ResMut<ShipmentBoard>,
    mut active: ResMut<ActiveShipment>,
) {
    if keys.just_pressed(KeyCode::KeyN) {
        active.0 = board.cycle().cloned();
        if let Some(s) = active.0.as_ref() {
            info!("Switched to shipment {}", s.tracking_number);
        }
    }

    if keys.just_pressed(KeyCode::KeyS) {
        let Some(shipment) = board.current_mut() else {
            return;
        };
        let next = shipment.status.next();
        if next == shipment.status {
            warn!("{} is already {}", shipment.tracking_number, shipment.status);
            return;
        }
        shipment.status = next;
        info!("{} advanced to {}", shipment.tracking_number, next);
        active.0 = Some(shipment.clone());
    }
}

fn vehicle_controls(
    keys: Res<ButtonInput<KeyCode>>,
    fleet: Res<Fleet>,
    mut filter: ResMut<VehicleFilter>,
    mut selected: ResMut<SelectedVehicle>,
) {
    let filter_changed = keys.just_pressed(KeyCode::KeyT) || keys.just_pressed(KeyCode::KeyO);
    if keys.just_pressed(KeyCode::KeyT) {
        filter.cycle_type();
    }
    if keys.just_pressed(KeyCode::KeyO) {
        filter.cycle_status();
    }
    if filter_changed {
        info!("Vehicle filter: {}", filter.label());
        selected.ensure_visible(&fleet, &filter);
    }

    if keys.just_pressed(KeyCode::KeyV) {
        selected.cycle(&fleet, &filter);
    }

    if filter_changed || keys.just_pressed(KeyCode::KeyV) {
        match selected.get(&fleet) {
            Some(vehicle) => info!("Selected vehicle {} ({})", vehicle.name, vehicle.vehicle_type),
            None => warn!("No vehicle matches {}", filter.label()),
        }
    }
}
