//! Which of the two views is on screen.

use bevy::prelude::*;

pub struct AppStatePlugin;

impl Plugin for AppStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ViewMode>()
            .add_systems(OnEnter(ViewMode::Route), log_view_change)
            .add_systems(OnEnter(ViewMode::Cargo), log_view_change);
    }
}

#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ViewMode {
    /// Map with pickup, drop, route and the simulated vehicle.
    #[default]
    Route,
    /// Truck model with its cargo fill.
    Cargo,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Route => ViewMode::Cargo,
            ViewMode::Cargo => ViewMode::Route,
        }
    }
}

fn log_view_change(mode: Res<State<ViewMode>>) {
    info!("View: {:?}", mode.get());
}
