use bevy::prelude::*;

use fleetview::{app_state, camera, cargo, demo, tracking, ui};

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Fleetview".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.95, 0.95, 0.96)))
        // Route / cargo view switching
        .add_plugins(app_state::AppStatePlugin)
        // Shipment tracking and the route map
        .add_plugins(tracking::TrackingPlugin)
        .add_plugins(tracking::markers::RouteViewPlugin)
        // Truck capacity view
        .add_plugins(cargo::CargoPlugin)
        .add_plugins(camera::CameraPlugin)
        // Seeded demo fleet and shipments
        .add_plugins(demo::DemoPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
