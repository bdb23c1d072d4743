//! Shipment tracking: route planning and the simulated vehicle marker.
//!
//! The active shipment lives in [`ActiveShipment`]. Whenever it (or the
//! tracking config) changes, every vehicle marker's animator is stopped and
//! restarted on the freshly planned route, so a marker never follows a stale
//! route and never has two timers driving it.

use std::time::Duration;

use bevy::prelude::*;

use crate::geo::{Coordinate, DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_ROUTE_POINTS};
use crate::shipment::route::RoutePlan;
use crate::shipment::ShipmentSnapshot;

pub mod animator;
pub mod markers;

pub use animator::{AnimatorPhase, PositionAnimator, TimerStats};

pub struct TrackingPlugin;

impl Plugin for TrackingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackingConfig>()
            .init_resource::<ActiveShipment>()
            .init_resource::<ActiveRoute>()
            .add_event::<MarkerMoved>()
            .add_systems(Startup, spawn_vehicle_marker)
            .add_systems(
                Update,
                (restart_on_shipment_change, tick_position_animators).chain(),
            );
    }
}

/// Configuration for route planning and marker animation.
#[derive(Resource, Clone, Debug)]
pub struct TrackingConfig {
    /// Segments the pickup-to-drop line is split into.
    pub route_segments: usize,
    /// Assumed average speed for arrival estimates (km/h).
    pub average_speed_kmh: f64,
    /// Delay between marker steps (ms).
    pub step_interval_ms: u64,
    /// Pause at the drop before the marker loops (ms).
    pub loop_pause_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            route_segments: DEFAULT_ROUTE_POINTS,
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            step_interval_ms: 600,
            loop_pause_ms: 2000,
        }
    }
}

impl TrackingConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn loop_pause(&self) -> Duration {
        Duration::from_millis(self.loop_pause_ms)
    }
}

/// Shipment currently shown on the route view.
#[derive(Resource, Default)]
pub struct ActiveShipment(pub Option<ShipmentSnapshot>);

/// Route planned for [`ActiveShipment`].
#[derive(Resource, Default)]
pub struct ActiveRoute(pub Option<RoutePlan>);

/// Marker for the simulated vehicle on the route view.
#[derive(Component)]
pub struct VehicleMarker;

/// Latest position emitted by the entity's animator.
#[derive(Component, Default)]
pub struct MarkerPosition(pub Option<Coordinate>);

/// Sent for every position a marker animator emits.
#[derive(Event, Debug)]
pub struct MarkerMoved {
    pub entity: Entity,
    pub position: Coordinate,
}

fn spawn_vehicle_marker(mut commands: Commands, config: Res<TrackingConfig>) {
    commands.spawn((
        VehicleMarker,
        PositionAnimator::new(config.step_interval(), config.loop_pause()),
        MarkerPosition::default(),
    ));
}

fn restart_on_shipment_change(
    shipment: Res<ActiveShipment>,
    config: Res<TrackingConfig>,
    mut route: ResMut<ActiveRoute>,
    mut animators: Query<(Entity, &mut PositionAnimator, &mut MarkerPosition)>,
    mut moved: EventWriter<MarkerMoved>,
) {
    if !shipment.is_changed() && !config.is_changed() {
        return;
    }

    route.0 = shipment
        .0
        .as_ref()
        .map(|s| RoutePlan::for_shipment(s, config.route_segments, config.average_speed_kmh));

    for (entity, mut animator, mut marker) in &mut animators {
        if config.is_changed() {
            animator.retime(config.step_interval(), config.loop_pause());
        }
        animator.stop();

        let Some(plan) = route.0.as_ref() else {
            marker.0 = None;
            continue;
        };

        marker.0 = animator.start(plan.points.clone(), plan.progress);
        if let Some(position) = marker.0 {
            moved.send(MarkerMoved { entity, position });
        }
    }

    match (shipment.0.as_ref(), route.0.as_ref()) {
        (Some(s), Some(plan)) => info!(
            "Tracking {} ({}, {}%): {:.1} km, ~{} min",
            s.tracking_number, s.status, plan.progress, plan.distance_km, plan.eta_minutes
        ),
        _ => info!("Tracking cleared"),
    }
}

fn tick_position_animators(
    time: Res<Time>,
    mut animators: Query<(Entity, &mut PositionAnimator, &mut MarkerPosition)>,
    mut moved: EventWriter<MarkerMoved>,
) {
    let delta = time.delta();

    for (entity, mut animator, mut marker) in &mut animators {
        if animator.live_timers() == 0 {
            continue;
        }

        let emitted = animator.tick(delta);
        if let Some(&last) = emitted.last() {
            marker.0 = Some(last);
        }
        for position in emitted {
            moved.send(MarkerMoved { entity, position });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;

    use crate::shipment::{ShipmentStatus, DEMO_DROP, DEMO_PICKUP};

    fn shipment(id: u32, status: ShipmentStatus) -> ShipmentSnapshot {
        ShipmentSnapshot {
            id,
            tracking_number: format!("TRK-{id:04}"),
            status,
            pickup: Some(DEMO_PICKUP),
            drop: Some(DEMO_DROP),
            ..Default::default()
        }
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TrackingPlugin)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));
        app.update();
        app
    }

    #[derive(Resource, Default)]
    struct MoveLog(Vec<Coordinate>);

    fn record_moves(mut moved: EventReader<MarkerMoved>, mut log: ResMut<MoveLog>) {
        log.0.extend(moved.read().map(|event| event.position));
    }

    /// App whose clock advances one step interval per frame.
    fn stepping_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TrackingPlugin)
            .init_resource::<MoveLog>()
            .add_systems(Update, record_moves.after(tick_position_animators))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(600)));
        // Virtual time clamps each frame to 250 ms by default.
        app.world_mut()
            .resource_mut::<Time<Virtual>>()
            .set_max_delta(Duration::from_secs(5));
        // The first frame only records the starting instant.
        app.update();
        app
    }

    fn animator_stats(app: &mut App) -> (TimerStats, usize) {
        let mut query = app.world_mut().query::<&PositionAnimator>();
        let animator = query.single(app.world());
        (animator.stats(), animator.live_timers())
    }

    #[test]
    fn no_shipment_means_no_route_and_no_timer() {
        let mut app = test_app();
        assert!(app.world().resource::<ActiveRoute>().0.is_none());
        let (stats, live) = animator_stats(&mut app);
        assert_eq!(stats.scheduled, 0);
        assert_eq!(live, 0);
    }

    #[test]
    fn activating_a_shipment_plans_and_starts() {
        let mut app = test_app();
        app.world_mut().resource_mut::<ActiveShipment>().0 =
            Some(shipment(1, ShipmentStatus::InTransit));
        app.update();

        let plan = app.world().resource::<ActiveRoute>().0.clone().unwrap();
        assert_eq!(plan.points.len(), 51);
        assert_eq!(plan.progress, 60);

        let (stats, live) = animator_stats(&mut app);
        assert_eq!(stats.scheduled, 1);
        assert_eq!(live, 1);

        let mut markers = app.world_mut().query::<&MarkerPosition>();
        assert_eq!(markers.single(app.world()).0, Some(plan.points[30]));
    }

    #[test]
    fn switching_shipments_keeps_exactly_one_timer() {
        let mut app = test_app();
        app.world_mut().resource_mut::<ActiveShipment>().0 =
            Some(shipment(1, ShipmentStatus::InTransit));
        app.update();

        app.world_mut().resource_mut::<ActiveShipment>().0 =
            Some(shipment(2, ShipmentStatus::PickedUp));
        app.update();

        let (stats, live) = animator_stats(&mut app);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.scheduled, 2);
        assert_eq!(stats.live(), 1);
        assert_eq!(live, 1);

        // Untouched frames do not restart anything.
        app.update();
        app.update();
        let (again, _) = animator_stats(&mut app);
        assert_eq!(again, stats);
    }

    #[test]
    fn frames_step_the_marker_along_the_route() {
        let mut app = stepping_app();
        app.world_mut().resource_mut::<ActiveShipment>().0 =
            Some(shipment(1, ShipmentStatus::InTransit));
        app.update();
        let points = app.world().resource::<ActiveRoute>().0.clone().unwrap().points;

        // Start emits route[30]; the same 600 ms frame fires the first step.
        assert_eq!(app.world().resource::<MoveLog>().0, points[30..=31].to_vec());

        for _ in 0..5 {
            app.update();
        }
        assert_eq!(app.world().resource::<MoveLog>().0, points[30..=36].to_vec());

        let mut markers = app.world_mut().query::<&MarkerPosition>();
        assert_eq!(markers.single(app.world()).0, Some(points[36]));
        let (stats, live) = animator_stats(&mut app);
        assert_eq!(live, 1);
        assert_eq!(stats.live(), 1);
        assert_eq!(stats.fired, 6);
    }

    #[test]
    fn marker_loops_back_after_the_pause() {
        let mut app = stepping_app();
        app.world_mut().resource_mut::<ActiveShipment>().0 =
            Some(shipment(1, ShipmentStatus::InTransit));
        app.update();
        let points = app.world().resource::<ActiveRoute>().0.clone().unwrap().points;

        // 30..=50 takes 21 emissions: start plus 20 fired steps.
        for _ in 0..19 {
            app.update();
        }
        assert_eq!(app.world().resource::<MoveLog>().0.last(), Some(&points[50]));

        // Past the end: schedule the 2000 ms pause, nothing emitted.
        app.update();
        let emitted = app.world().resource::<MoveLog>().0.len();
        assert_eq!(emitted, 21);

        // 1800 ms of the pause elapse without a move.
        for _ in 0..3 {
            app.update();
        }
        assert_eq!(app.world().resource::<MoveLog>().0.len(), emitted);

        // The pause ends 200 ms into this frame and the loop restarts at route[30].
        app.update();
        assert_eq!(app.world().resource::<MoveLog>().0.last(), Some(&points[30]));
        let (_, live) = animator_stats(&mut app);
        assert_eq!(live, 1);
    }

    #[test]
    fn status_change_to_confirmed_pins_marker_to_drop() {
        let mut app = test_app();
        app.world_mut().resource_mut::<ActiveShipment>().0 =
            Some(shipment(3, ShipmentStatus::InTransit));
        app.update();

        if let Some(s) = app.world_mut().resource_mut::<ActiveShipment>().0.as_mut() {
            s.status = ShipmentStatus::Confirmed;
        }
        app.update();

        let (stats, live) = animator_stats(&mut app);
        assert_eq!(live, 0);
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.cancelled, 1);

        let mut markers = app.world_mut().query::<&MarkerPosition>();
        assert_eq!(markers.single(app.world()).0, Some(DEMO_DROP));
    }
}
