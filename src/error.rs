//! Errors raised while decoding backend records.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown shipment status `{0}`")]
    UnknownShipmentStatus(String),
    #[error("unknown vehicle type `{0}`")]
    UnknownVehicleType(String),
    #[error("unknown vehicle status `{0}`")]
    UnknownVehicleStatus(String),
}
