//! Fleetview - shipment route simulation and cargo capacity visualizer.
//!
//! A Bevy app with two views: a map that animates a vehicle along the
//! active shipment's route, and a truck model filled with boxes according
//! to the selected vehicle's volume usage.

pub mod app_state;
pub mod camera;
pub mod cargo;
pub mod demo;
pub mod error;
pub mod geo;
pub mod shipment;
pub mod tracking;
pub mod ui;
