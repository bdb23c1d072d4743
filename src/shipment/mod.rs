//! Shipment snapshots and the status-to-progress mapping.
//!
//! Shipments are owned by the backend; this side only reads a snapshot of
//! one and turns its status into a completion percentage on a fixed scale.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::geo::Coordinate;

pub mod route;

/// Pickup used when a shipment carries no usable pickup coordinate.
pub const DEMO_PICKUP: Coordinate = Coordinate::new(17.385044, 78.486671);
/// Drop used when a shipment carries no usable drop coordinate.
pub const DEMO_DROP: Coordinate = Coordinate::new(17.440081, 78.348915);

/// Lifecycle of a shipment as reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Assigned,
    PickedUp,
    InTransit,
    Delivered,
    Confirmed,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 7] = [
        ShipmentStatus::Pending,
        ShipmentStatus::Assigned,
        ShipmentStatus::PickedUp,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
        ShipmentStatus::Confirmed,
        ShipmentStatus::Cancelled,
    ];

    /// Steps shown on the progress timeline, in order.
    pub const TIMELINE: [ShipmentStatus; 6] = [
        ShipmentStatus::Pending,
        ShipmentStatus::Assigned,
        ShipmentStatus::PickedUp,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
        ShipmentStatus::Confirmed,
    ];

    /// Wire code used by the backend.
    pub fn code(self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "PENDING",
            ShipmentStatus::Assigned => "ASSIGNED",
            ShipmentStatus::PickedUp => "PICKED_UP",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Confirmed => "CONFIRMED",
            ShipmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label, e.g. `PICKED UP`.
    pub fn label(self) -> String {
        self.code().replace('_', " ")
    }

    /// Completion percentage on the fixed 0-100 scale.
    pub fn progress(self) -> u8 {
        match self {
            ShipmentStatus::Pending => 0,
            ShipmentStatus::Assigned => 10,
            ShipmentStatus::PickedUp => 30,
            ShipmentStatus::InTransit => 60,
            ShipmentStatus::Delivered => 95,
            ShipmentStatus::Confirmed => 100,
            ShipmentStatus::Cancelled => 0,
        }
    }

    /// A vehicle is on the road for this shipment.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            ShipmentStatus::Assigned | ShipmentStatus::PickedUp | ShipmentStatus::InTransit
        )
    }

    /// Forward step in the lifecycle. Terminal states stay put.
    pub fn next(self) -> ShipmentStatus {
        match self {
            ShipmentStatus::Pending => ShipmentStatus::Assigned,
            ShipmentStatus::Assigned => ShipmentStatus::PickedUp,
            ShipmentStatus::PickedUp => ShipmentStatus::InTransit,
            ShipmentStatus::InTransit => ShipmentStatus::Delivered,
            ShipmentStatus::Delivered => ShipmentStatus::Confirmed,
            ShipmentStatus::Confirmed => ShipmentStatus::Confirmed,
            ShipmentStatus::Cancelled => ShipmentStatus::Cancelled,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ShipmentStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipmentStatus::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| ParseError::UnknownShipmentStatus(s.to_string()))
    }
}

pub fn progress_for_status(status: ShipmentStatus) -> u8 {
    status.progress()
}

/// Progress for a raw backend status code. Unknown codes count as not started.
pub fn progress_for_code(code: &str) -> u8 {
    code.parse::<ShipmentStatus>()
        .map(progress_for_status)
        .unwrap_or(0)
}

/// Whether `step` is already behind a shipment currently at `current`.
pub fn timeline_step_completed(current: ShipmentStatus, step: ShipmentStatus) -> bool {
    current.progress() >= step.progress()
}

/// Text for the estimated-arrival field.
pub fn arrival_label(status: ShipmentStatus, eta_minutes: u32) -> String {
    match status {
        ShipmentStatus::Delivered | ShipmentStatus::Confirmed => "Delivered".to_string(),
        _ => format!("~{eta_minutes} min"),
    }
}

/// Read-only view of a backend shipment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShipmentSnapshot {
    pub id: u32,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub pickup: Option<Coordinate>,
    pub drop: Option<Coordinate>,
    pub pickup_address: String,
    pub drop_address: String,
    pub assigned_vehicle_id: Option<u32>,
}

impl ShipmentSnapshot {
    pub fn progress(&self) -> u8 {
        progress_for_status(self.status)
    }

    pub fn pickup_or_default(&self) -> Coordinate {
        coordinate_or(self.pickup, DEMO_PICKUP)
    }

    pub fn drop_or_default(&self) -> Coordinate {
        coordinate_or(self.drop, DEMO_DROP)
    }
}

/// Fill unusable components field by field. Zero and NaN count as missing.
fn coordinate_or(value: Option<Coordinate>, fallback: Coordinate) -> Coordinate {
    let usable = |v: f64| v != 0.0 && !v.is_nan();
    match value {
        Some(c) => Coordinate {
            lat: if usable(c.lat) { c.lat } else { fallback.lat },
            lng: if usable(c.lng) { c.lng } else { fallback.lng },
        },
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_table() {
        assert_eq!(progress_for_code("PENDING"), 0);
        assert_eq!(progress_for_code("ASSIGNED"), 10);
        assert_eq!(progress_for_code("PICKED_UP"), 30);
        assert_eq!(progress_for_code("IN_TRANSIT"), 60);
        assert_eq!(progress_for_code("DELIVERED"), 95);
        assert_eq!(progress_for_code("CONFIRMED"), 100);
        assert_eq!(progress_for_code("CANCELLED"), 0);
    }

    #[test]
    fn unknown_codes_are_not_started() {
        assert_eq!(progress_for_code(""), 0);
        assert_eq!(progress_for_code("in_transit"), 0);
        assert_eq!(progress_for_code("LOST"), 0);
    }

    #[test]
    fn parse_round_trips_codes() {
        for status in ShipmentStatus::ALL {
            assert_eq!(status.code().parse::<ShipmentStatus>(), Ok(status));
        }
        assert_eq!(
            "LOST".parse::<ShipmentStatus>(),
            Err(ParseError::UnknownShipmentStatus("LOST".into()))
        );
    }

    #[test]
    fn live_statuses() {
        let live: Vec<_> = ShipmentStatus::ALL.into_iter().filter(|s| s.is_live()).collect();
        assert_eq!(
            live,
            vec![
                ShipmentStatus::Assigned,
                ShipmentStatus::PickedUp,
                ShipmentStatus::InTransit
            ]
        );
    }

    #[test]
    fn lifecycle_advances_and_stops() {
        let mut status = ShipmentStatus::Pending;
        let mut seen = vec![status];
        while status.next() != status {
            status = status.next();
            seen.push(status);
        }
        assert_eq!(seen, ShipmentStatus::TIMELINE.to_vec());
        assert_eq!(ShipmentStatus::Cancelled.next(), ShipmentStatus::Cancelled);
    }

    #[test]
    fn timeline_completion() {
        let current = ShipmentStatus::PickedUp;
        let done: Vec<_> = ShipmentStatus::TIMELINE
            .into_iter()
            .filter(|step| timeline_step_completed(current, *step))
            .collect();
        assert_eq!(
            done,
            vec![
                ShipmentStatus::Pending,
                ShipmentStatus::Assigned,
                ShipmentStatus::PickedUp
            ]
        );
        assert_eq!(ShipmentStatus::PickedUp.label(), "PICKED UP");
    }

    #[test]
    fn arrival_text() {
        assert_eq!(arrival_label(ShipmentStatus::InTransit, 32), "~32 min");
        assert_eq!(arrival_label(ShipmentStatus::Delivered, 32), "Delivered");
        assert_eq!(arrival_label(ShipmentStatus::Confirmed, 0), "Delivered");
    }

    #[test]
    fn missing_coordinates_fall_back_to_demo() {
        let mut shipment = ShipmentSnapshot::default();
        assert_eq!(shipment.pickup_or_default(), DEMO_PICKUP);
        assert_eq!(shipment.drop_or_default(), DEMO_DROP);

        shipment.pickup = Some(Coordinate::new(17.5, 0.0));
        assert_eq!(
            shipment.pickup_or_default(),
            Coordinate::new(17.5, DEMO_PICKUP.lng)
        );

        shipment.drop = Some(Coordinate::new(17.45, 78.4));
        assert_eq!(shipment.drop_or_default(), Coordinate::new(17.45, 78.4));
    }
}
