use crate::types::{BuildingType, Coord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Placement rejected: {0}")]
    Placement(#[from] PlacementError),

    #[error("Corrupt snapshot: {reason}")]
    CorruptSnapshot { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Why a placement request was refused. Nothing is mutated on any of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Unknown building type '{building_type}'")]
    UnknownBuildingType { building_type: BuildingType },

    #[error("Insufficient funds: cost {cost}, available {available}")]
    InsufficientFunds { cost: f64, available: f64 },

    #[error("Cell ({x}, {y}) is already occupied")]
    CellOccupied { x: Coord, y: Coord },

    #[error("Coordinates ({x}, {y}) are outside the grid")]
    OutOfBounds { x: f64, y: f64 },
}
