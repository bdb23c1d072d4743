//! Simulated vehicle position along a planned route.
//!
//! There is no GPS feed, so an in-progress delivery is visualized by stepping
//! a marker along the interpolated route from the point matching its
//! progress, looping back after a pause once the drop is reached.
//!
//! The animator owns its timer. `start` always cancels a pending timer before
//! scheduling, `stop` cancels it outright, and at most one timer is pending at
//! any moment. Time only moves when the owner calls [`PositionAnimator::tick`],
//! which makes the loop trivially drivable from a manual clock.

use std::time::Duration;

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::geo::Coordinate;
use crate::shipment::route::progress_index;

/// Delay between route steps.
pub const STEP_INTERVAL: Duration = Duration::from_millis(600);
/// Pause at the drop before the loop restarts.
pub const LOOP_PAUSE: Duration = Duration::from_millis(2000);
/// Progress at or above which the marker is pinned to the drop.
pub const ARRIVED_PROGRESS: u8 = 95;

const MIN_DELAY: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimatorPhase {
    /// Stopped, or started with an empty route.
    #[default]
    Idle,
    /// Pinned to the pickup; nothing scheduled.
    AtStart,
    /// Pinned to the drop; nothing scheduled.
    AtEnd,
    /// Stepping along the route on a timer.
    Animating,
}

/// Timer bookkeeping, exposed so callers can check the single-timer rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerStats {
    pub scheduled: u64,
    pub cancelled: u64,
    pub fired: u64,
}

impl TimerStats {
    /// Timers scheduled but neither cancelled nor fired.
    pub fn live(&self) -> u64 {
        self.scheduled - self.cancelled - self.fired
    }
}

#[derive(Component, Debug)]
pub struct PositionAnimator {
    step_interval: Duration,
    loop_pause: Duration,
    route: Vec<Coordinate>,
    phase: AnimatorPhase,
    start_index: usize,
    current_index: usize,
    position: Option<Coordinate>,
    pending: Option<Timer>,
    stats: TimerStats,
}

impl Default for PositionAnimator {
    fn default() -> Self {
        Self::new(STEP_INTERVAL, LOOP_PAUSE)
    }
}

impl PositionAnimator {
    pub fn new(step_interval: Duration, loop_pause: Duration) -> Self {
        Self {
            step_interval: step_interval.max(MIN_DELAY),
            loop_pause: loop_pause.max(MIN_DELAY),
            route: Vec::new(),
            phase: AnimatorPhase::Idle,
            start_index: 0,
            current_index: 0,
            position: None,
            pending: None,
            stats: TimerStats::default(),
        }
    }

    /// Change the step interval and loop pause. Stops the animator.
    pub fn retime(&mut self, step_interval: Duration, loop_pause: Duration) {
        self.stop();
        self.step_interval = step_interval.max(MIN_DELAY);
        self.loop_pause = loop_pause.max(MIN_DELAY);
    }

    /// Begin showing `route` at `progress` percent.
    ///
    /// Cancels whatever was running first. Returns the marker position right
    /// after starting, if the route has any points.
    pub fn start(&mut self, route: Vec<Coordinate>, progress: u8) -> Option<Coordinate> {
        self.stop();
        self.route = route;

        let (first, last) = match (self.route.first(), self.route.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return None,
        };

        if progress == 0 {
            self.phase = AnimatorPhase::AtStart;
            self.position = Some(first);
        } else if progress >= ARRIVED_PROGRESS {
            self.phase = AnimatorPhase::AtEnd;
            self.position = Some(last);
        } else {
            self.phase = AnimatorPhase::Animating;
            self.start_index = progress_index(progress, self.route.len()).min(self.route.len() - 1);
            self.current_index = self.start_index;
            self.step();
        }

        self.position
    }

    /// Cancel the pending timer and go idle. The last position is kept.
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            self.stats.cancelled += 1;
        }
        self.phase = AnimatorPhase::Idle;
        self.route.clear();
        self.start_index = 0;
        self.current_index = 0;
    }

    /// Let `delta` elapse, firing every timer that comes due in order.
    ///
    /// Returns the positions emitted during this tick, oldest first.
    pub fn tick(&mut self, delta: Duration) -> SmallVec<[Coordinate; 2]> {
        let mut emitted = SmallVec::new();
        let mut budget = delta;

        while let Some(timer) = self.pending.as_mut() {
            let remaining = timer.remaining();
            if budget < remaining {
                timer.tick(budget);
                break;
            }
            budget -= remaining;

            self.pending = None;
            self.stats.fired += 1;
            if let Some(position) = self.step() {
                emitted.push(position);
            }
        }

        emitted
    }

    /// One iteration of the loop: emit the next point, or rewind after the end.
    fn step(&mut self) -> Option<Coordinate> {
        if let Some(&point) = self.route.get(self.current_index) {
            self.position = Some(point);
            self.current_index += 1;
            self.schedule(self.step_interval);
            Some(point)
        } else {
            self.current_index = self.start_index;
            self.schedule(self.loop_pause);
            None
        }
    }

    fn schedule(&mut self, delay: Duration) {
        debug_assert!(self.pending.is_none(), "animator already has a pending timer");
        self.pending = Some(Timer::new(delay, TimerMode::Once));
        self.stats.scheduled += 1;
    }

    pub fn phase(&self) -> AnimatorPhase {
        self.phase
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn live_timers(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    /// Time until the pending timer fires.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.as_ref().map(Timer::remaining)
    }

    pub fn stats(&self) -> TimerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{interpolate_route, DEFAULT_ROUTE_POINTS};
    use crate::shipment::{ShipmentStatus, DEMO_DROP, DEMO_PICKUP};

    fn route() -> Vec<Coordinate> {
        interpolate_route(DEMO_PICKUP, DEMO_DROP, DEFAULT_ROUTE_POINTS)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn pending_pins_to_pickup_without_timer() {
        let mut animator = PositionAnimator::default();
        let pos = animator.start(route(), ShipmentStatus::Pending.progress());

        assert_eq!(pos, Some(DEMO_PICKUP));
        assert_eq!(animator.phase(), AnimatorPhase::AtStart);
        assert_eq!(animator.live_timers(), 0);
        assert_eq!(animator.stats().scheduled, 0);
        assert!(animator.tick(ms(10_000)).is_empty());
        assert_eq!(animator.position(), Some(DEMO_PICKUP));
    }

    #[test]
    fn confirmed_and_delivered_pin_to_drop() {
        for status in [ShipmentStatus::Confirmed, ShipmentStatus::Delivered] {
            let mut animator = PositionAnimator::default();
            assert_eq!(animator.start(route(), status.progress()), Some(DEMO_DROP));
            assert_eq!(animator.phase(), AnimatorPhase::AtEnd);
            assert_eq!(animator.live_timers(), 0);
            assert_eq!(animator.stats().scheduled, 0);
        }
    }

    #[test]
    fn in_transit_starts_at_progress_point() {
        let points = route();
        let mut animator = PositionAnimator::default();
        let pos = animator.start(points.clone(), ShipmentStatus::InTransit.progress());

        assert_eq!(animator.phase(), AnimatorPhase::Animating);
        assert_eq!(animator.start_index(), 30);
        assert_eq!(pos, Some(points[30]));
        assert_eq!(animator.live_timers(), 1);
        assert_eq!(animator.next_due(), Some(STEP_INTERVAL));
    }

    #[test]
    fn steps_once_per_interval() {
        let points = route();
        let mut animator = PositionAnimator::default();
        animator.start(points.clone(), 60);

        assert!(animator.tick(ms(599)).is_empty());
        assert_eq!(animator.tick(ms(1)).as_slice(), &[points[31]]);
        assert_eq!(animator.tick(ms(600)).as_slice(), &[points[32]]);
        assert_eq!(animator.position(), Some(points[32]));
        assert_eq!(animator.live_timers(), 1);
    }

    #[test]
    fn long_tick_fires_each_step_in_order() {
        let points = route();
        let mut animator = PositionAnimator::default();
        animator.start(points.clone(), 60);

        let emitted = animator.tick(ms(1_800));
        assert_eq!(emitted.as_slice(), &[points[31], points[32], points[33]]);
        assert_eq!(animator.stats().fired, 3);
        assert_eq!(animator.live_timers(), 1);
    }

    #[test]
    fn loops_back_after_pause() {
        let points = route();
        let mut animator = PositionAnimator::default();
        animator.start(points.clone(), 60);

        // route[31..=50] remain after the start point.
        let emitted = animator.tick(ms(20 * 600));
        assert_eq!(emitted.len(), 20);
        assert_eq!(emitted.last(), Some(&points[50]));

        // End of route: rewind and wait for the longer pause, emitting nothing.
        assert!(animator.tick(ms(600)).is_empty());
        assert_eq!(animator.current_index(), 30);
        assert_eq!(animator.next_due(), Some(LOOP_PAUSE));

        assert!(animator.tick(ms(1_999)).is_empty());
        assert_eq!(animator.tick(ms(1)).as_slice(), &[points[30]]);
        assert_eq!(animator.live_timers(), 1);
    }

    #[test]
    fn restart_cancels_before_rescheduling() {
        let points = route();
        let mut animator = PositionAnimator::default();
        animator.start(points.clone(), 60);
        animator.tick(ms(700));

        let before = animator.stats();
        assert_eq!(before.live(), 1);

        let other = interpolate_route(DEMO_DROP, DEMO_PICKUP, DEFAULT_ROUTE_POINTS);
        animator.start(other.clone(), 30);

        let after = animator.stats();
        assert_eq!(after.cancelled, before.cancelled + 1);
        assert_eq!(after.scheduled, before.scheduled + 1);
        assert_eq!(after.live(), 1);
        assert_eq!(animator.live_timers(), 1);
        assert_eq!(animator.position(), Some(other[15]));
    }

    #[test]
    fn switching_to_pinned_status_leaves_no_timer() {
        let mut animator = PositionAnimator::default();
        animator.start(route(), 60);
        animator.start(route(), 100);

        assert_eq!(animator.live_timers(), 0);
        assert_eq!(animator.stats().live(), 0);
        assert_eq!(animator.stats().cancelled, 1);
    }

    #[test]
    fn stop_cancels_and_freezes() {
        let points = route();
        let mut animator = PositionAnimator::default();
        animator.start(points.clone(), 10);
        animator.stop();

        assert_eq!(animator.phase(), AnimatorPhase::Idle);
        assert_eq!(animator.live_timers(), 0);
        assert_eq!(animator.stats().cancelled, 1);
        assert!(animator.tick(ms(60_000)).is_empty());
        assert_eq!(animator.position(), Some(points[5]));

        // Stopping twice cancels nothing more.
        animator.stop();
        assert_eq!(animator.stats().cancelled, 1);
    }

    #[test]
    fn empty_route_stays_idle() {
        let mut animator = PositionAnimator::default();
        assert_eq!(animator.start(Vec::new(), 60), None);
        assert_eq!(animator.phase(), AnimatorPhase::Idle);
        assert_eq!(animator.live_timers(), 0);
    }

    #[test]
    fn delays_are_clamped() {
        let mut animator = PositionAnimator::new(Duration::ZERO, Duration::ZERO);
        animator.start(route(), 60);
        assert_eq!(animator.next_due(), Some(MIN_DELAY));
        // 25 firings: 20 steps to the drop, one rewind, then 4 more steps.
        let emitted = animator.tick(ms(25));
        assert_eq!(emitted.len(), 24);
    }
}
