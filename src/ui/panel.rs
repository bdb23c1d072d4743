//! Side panel with shipment tracking details or vehicle capacity, depending
//! on the active view.

use bevy::prelude::*;

use crate::app_state::ViewMode;
use crate::cargo::vehicle::{CapacityLevel, FleetStats, VehicleRecord};
use crate::cargo::{Fleet, SelectedVehicle};
use crate::shipment::route::RoutePlan;
use crate::shipment::{arrival_label, timeline_step_completed, ShipmentSnapshot, ShipmentStatus};
use crate::tracking::{ActiveRoute, ActiveShipment};

pub struct InfoPanelPlugin;

impl Plugin for InfoPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_info_panel).add_systems(
            Update,
            (
                update_route_panel,
                update_cargo_panel,
                show_panel_for_view.run_if(state_changed::<ViewMode>),
            ),
        );
    }
}

#[derive(Component)]
struct RoutePanel;

#[derive(Component)]
struct CargoPanel;

#[derive(Component)]
struct RouteHeaderText;

#[derive(Component)]
struct RouteDetailText;

#[derive(Component)]
struct TimelineText;

#[derive(Component)]
struct CargoHeaderText;

#[derive(Component)]
struct CargoDetailText;

#[derive(Component)]
struct FleetText;

#[derive(Component, Clone, Copy)]
enum Meter {
    Progress,
    Weight,
    Volume,
}

// Colors
const PANEL_BG: Color = Color::srgba(0.98, 0.98, 0.98, 0.92);
const TEXT_COLOR: Color = Color::srgb(0.15, 0.15, 0.15);
const MUTED_TEXT: Color = Color::srgb(0.45, 0.45, 0.47);
const ACCENT: Color = Color::srgb(0.94, 0.27, 0.27);
const METER_BG: Color = Color::srgba(0.1, 0.1, 0.1, 0.12);

fn panel_node() -> Node {
    Node {
        position_type: PositionType::Absolute,
        top: Val::Px(10.0),
        left: Val::Px(10.0),
        width: Val::Px(300.0),
        padding: UiRect::all(Val::Px(14.0)),
        flex_direction: FlexDirection::Column,
        row_gap: Val::Px(8.0),
        ..default()
    }
}

fn text(value: &str, size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(value),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn setup_info_panel(mut commands: Commands) {
    commands
        .spawn((panel_node(), BackgroundColor(PANEL_BG), RoutePanel))
        .with_children(|panel| {
            panel.spawn((text("No shipment", 18.0, TEXT_COLOR), RouteHeaderText));
            spawn_meter(panel, "Progress", Meter::Progress, ACCENT);
            panel.spawn((text("", 14.0, MUTED_TEXT), RouteDetailText));
            panel.spawn((text("", 13.0, TEXT_COLOR), TimelineText));
        });

    commands
        .spawn((
            panel_node(),
            BackgroundColor(PANEL_BG),
            Visibility::Hidden,
            CargoPanel,
        ))
        .with_children(|panel| {
            panel.spawn((text("No vehicle", 18.0, TEXT_COLOR), CargoHeaderText));
            spawn_meter(panel, "Weight", Meter::Weight, Color::srgb(0.83, 0.63, 0.09));
            spawn_meter(panel, "Volume", Meter::Volume, ACCENT);
            panel.spawn((text("", 14.0, MUTED_TEXT), CargoDetailText));
            panel.spawn((text("", 13.0, TEXT_COLOR), FleetText));
        });
}

fn spawn_meter(parent: &mut ChildBuilder, label: &str, meter: Meter, color: Color) {
    parent
        .spawn((Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: Val::Px(8.0),
            ..default()
        },))
        .with_children(|row| {
            row.spawn(text(label, 13.0, MUTED_TEXT));
            row.spawn((
                Node {
                    width: Val::Px(180.0),
                    height: Val::Px(10.0),
                    ..default()
                },
                BackgroundColor(METER_BG),
            ))
            .with_children(|bg| {
                bg.spawn((
                    Node {
                        width: Val::Percent(0.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(color),
                    meter,
                ));
            });
        });
}

/// Header line: tracking number, status and a live badge.
pub fn route_header(shipment: &ShipmentSnapshot) -> String {
    let live = if shipment.status.is_live() { "  ● LIVE" } else { "" };
    format!("{}  [{}]{}", shipment.tracking_number, shipment.status.label(), live)
}

/// Distance, arrival estimate, endpoints and the assigned vehicle.
pub fn route_details(
    shipment: &ShipmentSnapshot,
    plan: &RoutePlan,
    vehicle: Option<&VehicleRecord>,
) -> String {
    let from = non_empty(&shipment.pickup_address, "Pickup");
    let to = non_empty(&shipment.drop_address, "Drop");
    format!(
        "{from} → {to}\nDistance: {:.1} km\nArrival: {}\nProgress: {}%\nVehicle: {}",
        plan.distance_km,
        arrival_label(shipment.status, plan.eta_minutes),
        plan.progress,
        assigned_vehicle_label(vehicle)
    )
}

fn assigned_vehicle_label(vehicle: Option<&VehicleRecord>) -> String {
    match vehicle {
        Some(v) => format!("{} ({})", v.name, non_empty(&v.plate_number, "n/a")),
        None => "Not assigned".to_string(),
    }
}

/// One line per lifecycle step, checked once reached.
pub fn timeline_lines(status: ShipmentStatus) -> String {
    if status == ShipmentStatus::Cancelled {
        return "✕ CANCELLED".to_string();
    }
    ShipmentStatus::TIMELINE
        .iter()
        .map(|&step| {
            let mark = if timeline_step_completed(status, step) { "✓" } else { "○" };
            format!("{mark} {}", step.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn vehicle_header(vehicle: &VehicleRecord) -> String {
    format!(
        "{} ({})  [{}]",
        vehicle.name,
        vehicle.vehicle_type.label(),
        vehicle.status.label()
    )
}

pub fn vehicle_details(vehicle: &VehicleRecord) -> String {
    let load = vehicle.load;
    format!(
        "Plate: {}\nWeight: {:.0} / {:.0} kg ({:.0}%)\nVolume: {:.1} / {:.1} m³ ({:.0}%)\nFill: {:.0}% ({})\nFree: {:.0} kg, {:.1} m³",
        non_empty(&vehicle.plate_number, "n/a"),
        load.weight_used,
        load.weight_capacity,
        load.weight_pct(),
        load.volume_used,
        load.volume_capacity,
        load.volume_pct(),
        load.display_pct(),
        CapacityLevel::from_pct(load.display_pct()).label(),
        load.remaining_weight(),
        load.remaining_volume(),
    )
}

pub fn fleet_summary(stats: &FleetStats) -> String {
    format!(
        "Fleet: {} vehicles\nAvg weight {}%  Avg volume {}%\nOverloaded: {}  Underutilized: {}",
        stats.total, stats.avg_weight_pct, stats.avg_volume_pct, stats.overloaded, stats.underutilized
    )
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn update_route_panel(
    shipment: Res<ActiveShipment>,
    route: Res<ActiveRoute>,
    fleet: Res<Fleet>,
    mut header: Query<&mut Text, (With<RouteHeaderText>, Without<RouteDetailText>, Without<TimelineText>)>,
    mut details: Query<&mut Text, (With<RouteDetailText>, Without<RouteHeaderText>, Without<TimelineText>)>,
    mut timeline: Query<&mut Text, (With<TimelineText>, Without<RouteHeaderText>, Without<RouteDetailText>)>,
    mut meters: Query<(&Meter, &mut Node)>,
) {
    if !shipment.is_changed() && !route.is_changed() && !fleet.is_changed() {
        return;
    }

    let (header_value, detail_value, timeline_value, progress) =
        match (shipment.0.as_ref(), route.0.as_ref()) {
            (Some(s), Some(plan)) => (
                route_header(s),
                route_details(s, plan, s.assigned_vehicle_id.and_then(|id| fleet.find(id))),
                timeline_lines(s.status),
                f32::from(plan.progress),
            ),
            _ => ("No shipment".to_string(), String::new(), String::new(), 0.0),
        };

    for mut text in &mut header {
        **text = header_value.clone();
    }
    for mut text in &mut details {
        **text = detail_value.clone();
    }
    for mut text in &mut timeline {
        **text = timeline_value.clone();
    }
    for (meter, mut node) in &mut meters {
        if matches!(meter, Meter::Progress) {
            node.width = Val::Percent(progress);
        }
    }
}

fn update_cargo_panel(
    fleet: Res<Fleet>,
    selected: Res<SelectedVehicle>,
    mut header: Query<&mut Text, (With<CargoHeaderText>, Without<CargoDetailText>, Without<FleetText>)>,
    mut details: Query<&mut Text, (With<CargoDetailText>, Without<CargoHeaderText>, Without<FleetText>)>,
    mut fleet_text: Query<&mut Text, (With<FleetText>, Without<CargoHeaderText>, Without<CargoDetailText>)>,
    mut meters: Query<(&Meter, &mut Node)>,
) {
    if !fleet.is_changed() && !selected.is_changed() {
        return;
    }

    let vehicle = selected.get(&fleet);
    let header_value = vehicle.map_or_else(|| "No vehicle".to_string(), vehicle_header);
    let detail_value = vehicle.map(vehicle_details).unwrap_or_default();
    let (weight, volume) = vehicle.map_or((0.0, 0.0), |v| (v.load.weight_pct(), v.load.volume_pct()));
    let summary = fleet_summary(&fleet.stats());

    for mut text in &mut header {
        **text = header_value.clone();
    }
    for mut text in &mut details {
        **text = detail_value.clone();
    }
    for mut text in &mut fleet_text {
        **text = summary.clone();
    }
    for (meter, mut node) in &mut meters {
        match meter {
            Meter::Weight => node.width = Val::Percent(weight),
            Meter::Volume => node.width = Val::Percent(volume),
            Meter::Progress => {}
        }
    }
}

fn show_panel_for_view(
    mode: Res<State<ViewMode>>,
    mut route_panel: Query<&mut Visibility, (With<RoutePanel>, Without<CargoPanel>)>,
    mut cargo_panel: Query<&mut Visibility, (With<CargoPanel>, Without<RoutePanel>)>,
) {
    let (route, cargo) = match mode.get() {
        ViewMode::Route => (Visibility::Inherited, Visibility::Hidden),
        ViewMode::Cargo => (Visibility::Hidden, Visibility::Inherited),
    };
    for mut visibility in &mut route_panel {
        *visibility = route;
    }
    for mut visibility in &mut cargo_panel {
        *visibility = cargo;
    }
}
