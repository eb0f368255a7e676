//! Engine events — the audit trail of every placement and tick.
//!
//! RULE: Every state change the engine makes is recorded in the event log.

use crate::{
    error::PlacementError,
    resolution::{SkippedBuilding, TickTotals},
    types::{BuildingType, Coord, RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Every event emitted by the engine.
/// Variants are appended over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunStarted {
        run_id:         RunId,
        building_count: usize,
    },
    BuildingPlaced {
        tick:          Tick,
        building_type: BuildingType,
        x:             Coord,
        y:             Coord,
        cost:          f64,
        money_after:   f64,
    },
    PlacementRejected {
        tick:          Tick,
        building_type: BuildingType,
        reason:        String,
    },
    BuildingSkipped {
        tick:     Tick,
        building: SkippedBuilding,
    },
    TickResolved {
        tick:      Tick,
        totals:    TickTotals,
        happiness: f64,
        citizens:  i64,
    },
}

impl SimEvent {
    /// Stable name used for the `kind` column in event_log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted { .. }        => "run_started",
            Self::BuildingPlaced { .. }    => "building_placed",
            Self::PlacementRejected { .. } => "placement_rejected",
            Self::BuildingSkipped { .. }   => "building_skipped",
            Self::TickResolved { .. }      => "tick_resolved",
        }
    }

    pub fn rejected(tick: Tick, building_type: &str, err: &PlacementError) -> Self {
        Self::PlacementRejected {
            tick,
            building_type: building_type.to_string(),
            reason:        err.to_string(),
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:      Option<i64>,
    pub run_id:  RunId,
    pub tick:    Tick,
    pub kind:    String,
    pub payload: String, // JSON-serialized SimEvent
}
