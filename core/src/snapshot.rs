//! Snapshot serialization — GameState to/from JSON.
//!
//! Decoding merges the stored document over the current defaults field by
//! field, so a field added to GameState in a later version keeps its
//! default instead of erasing the rest of a saved game.

use crate::{
    error::{SimError, SimResult},
    state::{GameState, HAPPINESS_MAX, HAPPINESS_MIN},
    types::CELL_SIZE,
};
use serde_json::Value;
use std::collections::HashSet;

/// Fixed key the snapshot lives under in the key-value table.
pub const SNAPSHOT_KEY: &str = "game_state";

pub fn encode(state: &GameState) -> SimResult<String> {
    Ok(serde_json::to_string(state)?)
}

/// Decode a stored snapshot on top of `GameState::default()`.
/// Anything unreadable is reported as `CorruptSnapshot`.
pub fn decode(json: &str) -> SimResult<GameState> {
    let stored: Value = serde_json::from_str(json).map_err(|e| SimError::CorruptSnapshot {
        reason: format!("not valid JSON: {e}"),
    })?;
    if !stored.is_object() {
        return Err(SimError::CorruptSnapshot {
            reason: "top-level value is not an object".into(),
        });
    }

    let mut merged = serde_json::to_value(GameState::default())?;
    merge_fields(&mut merged, stored);

    let mut state: GameState =
        serde_json::from_value(merged).map_err(|e| SimError::CorruptSnapshot {
            reason: format!("fields do not match the state layout: {e}"),
        })?;
    enforce_invariants(&mut state);
    Ok(state)
}

/// Bring a decoded state back inside the rules the engines maintain:
/// happiness in [0, 100], waste at or above zero, every building on the
/// grid and alone in its cell. Offending buildings are dropped; the first
/// building in a cell wins.
fn enforce_invariants(state: &mut GameState) {
    if !(HAPPINESS_MIN..=HAPPINESS_MAX).contains(&state.happiness) {
        let clamped = state.happiness.clamp(HAPPINESS_MIN, HAPPINESS_MAX);
        log::warn!("snapshot: happiness {} clamped to {clamped}", state.happiness);
        state.happiness = clamped;
    }
    if state.resources.waste < 0.0 {
        log::warn!("snapshot: negative waste {} reset to 0", state.resources.waste);
        state.resources.waste = 0.0;
    }

    let mut seen = HashSet::new();
    state.buildings.retain(|b| {
        if b.x % CELL_SIZE != 0 || b.y % CELL_SIZE != 0 {
            log::warn!(
                "snapshot: dropping {} at ({}, {}): not on the grid",
                b.building_type, b.x, b.y
            );
            return false;
        }
        if !seen.insert((b.x, b.y)) {
            log::warn!(
                "snapshot: dropping {} at ({}, {}): cell already occupied",
                b.building_type, b.x, b.y
            );
            return false;
        }
        true
    });
}

/// Overlay `stored` onto `base`. Objects merge per key; any other value
/// replaces the base value. Nulls count as absent.
fn merge_fields(base: &mut Value, stored: Value) {
    match (base, stored) {
        (Value::Object(base_map), Value::Object(stored_map)) => {
            for (key, value) in stored_map {
                if value.is_null() {
                    continue;
                }
                match base_map.get_mut(&key) {
                    Some(slot) => merge_fields(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
