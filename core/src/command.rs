use serde::{Deserialize, Serialize};
use crate::types::{BuildingType, Tick};

/// All player-issued commands — the discrete input queue.
/// Variants are appended over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: crate::clock::SimSpeed },

    // ── Building ──────────────────────────────────
    /// `x`/`y` are raw pointer coordinates; the engine snaps them.
    PlaceBuilding {
        building_type: BuildingType,
        x:             f64,
        y:             f64,
    },
}

/// A queued player command with its submission tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedCommand {
    pub queued_at:  Tick,
    pub command_id: String,
    pub command:    PlayerCommand,
}

impl QueuedCommand {
    pub fn new(queued_at: Tick, command: PlayerCommand) -> Self {
        Self {
            queued_at,
            command_id: uuid::Uuid::new_v4().to_string(),
            command,
        }
    }
}
