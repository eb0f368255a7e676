//! The canonical game state — the single source of truth.
//!
//! RULE: Only the placement and resolution engines mutate GameState,
//! and the engine persists it after every mutation.

use crate::types::{BuildingType, Coord};
use serde::{Deserialize, Serialize};

pub const HAPPINESS_MIN: f64 = 0.0;
pub const HAPPINESS_MAX: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourcePool {
    pub money:       f64,
    pub electricity: f64,
    pub water:       f64,
    pub waste:       f64,
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self {
            money:       1000.0,
            electricity: 100.0,
            water:       100.0,
            waste:       0.0,
        }
    }
}

/// A building on the grid. Immutable once placed; there is no demolition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedBuilding {
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub x:             Coord,
    pub y:             Coord,
    /// Display tag cached from the catalog at placement time.
    pub color:         String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub resources: ResourcePool,
    /// Insertion order is draw order and resolution order.
    pub buildings: Vec<PlacedBuilding>,
    pub citizens:  i64,
    pub happiness: f64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            resources: ResourcePool::default(),
            buildings: Vec::new(),
            citizens:  100,
            happiness: 75.0,
        }
    }
}

impl GameState {
    pub fn building_at(&self, x: Coord, y: Coord) -> Option<&PlacedBuilding> {
        self.buildings.iter().find(|b| b.x == x && b.y == y)
    }

    pub fn is_occupied(&self, x: Coord, y: Coord) -> bool {
        self.building_at(x, y).is_some()
    }

    /// Shift happiness by `delta`, keeping it inside [0, 100].
    pub fn adjust_happiness(&mut self, delta: f64) {
        self.happiness = (self.happiness + delta).clamp(HAPPINESS_MIN, HAPPINESS_MAX);
    }

    /// Number of placed buildings of a given type.
    pub fn count_of(&self, building_type: &str) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.building_type == building_type)
            .count()
    }
}
