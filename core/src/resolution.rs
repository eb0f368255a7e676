//! Resolution engine — one tick of passive production and consumption.
//!
//! ORDER (fixed):
//!   1. Buildings are visited in insertion order.
//!   2. Catalog deltas and batched bonuses accumulate into TickTotals.
//!   3. Immediate effects (residential penalty, park top-up) hit the
//!      state as each building is visited, so later buildings observe them.
//!   4. Totals are applied in one batch; happiness is clamped to [0, 100]
//!      and waste is floored at zero.
//!
//! A building whose type is missing from the catalog is skipped. It never
//! aborts the tick.

use crate::{
    config::BuildingCatalog,
    state::{GameState, HAPPINESS_MAX},
    types::{BuildingType, Coord},
};
use serde::{Deserialize, Serialize};

pub const COMMERCIAL_MONEY_BONUS:       f64 = 10.0;
pub const INDUSTRIAL_ELECTRICITY_BONUS: f64 = 10.0;
pub const WATER_FACTORY_WATER_BONUS:    f64 = 50.0;
pub const ECO_CLEANING_WASTE_BONUS:     f64 = -20.0;
pub const RESIDENTIAL_CITIZEN_BONUS:    i64 = 5;
pub const RESIDENTIAL_HAPPINESS_PENALTY: f64 = -0.1;
pub const PARK_HAPPINESS_BONUS:         f64 = 5.0;
pub const PARK_HAPPINESS_TOP_UP:        f64 = 0.5;
pub const SOLAR_ELECTRICITY_BONUS:      f64 = 50.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Money,
    Electricity,
    Water,
    Waste,
    Citizens,
    Happiness,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceDelta {
    pub resource: Resource,
    pub amount:   f64,
}

impl ResourceDelta {
    fn new(resource: Resource, amount: f64) -> Self {
        Self { resource, amount }
    }
}

/// Visible feedback for one building, e.g. a "+10 money" popup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingFeedback {
    /// Position in GameState::buildings.
    pub index:         usize,
    pub building_type: BuildingType,
    pub x:             Coord,
    pub y:             Coord,
    pub deltas:        Vec<ResourceDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedBuilding {
    pub index:         usize,
    pub building_type: BuildingType,
    pub x:             Coord,
    pub y:             Coord,
}

/// Batched deltas applied at the end of the tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TickTotals {
    pub money:       f64,
    pub electricity: f64,
    pub water:       f64,
    pub waste:       f64,
    pub citizens:    i64,
    pub happiness:   f64,
}

/// Informational output of one tick. The core never reads it back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TickReport {
    pub feedback: Vec<BuildingFeedback>,
    pub skipped:  Vec<SkippedBuilding>,
    pub totals:   TickTotals,
}

/// Resolve one tick against `state`, mutating it in place.
pub fn resolve_tick(state: &mut GameState, catalog: &BuildingCatalog) -> TickReport {
    let mut report = TickReport::default();
    let mut totals = TickTotals::default();

    for index in 0..state.buildings.len() {
        let building = &state.buildings[index];
        let Some(def) = catalog.get(&building.building_type) else {
            log::warn!(
                "resolution: skipping building #{index} at ({}, {}): unknown type '{}'",
                building.x,
                building.y,
                building.building_type
            );
            report.skipped.push(SkippedBuilding {
                index,
                building_type: building.building_type.clone(),
                x:             building.x,
                y:             building.y,
            });
            continue;
        };

        totals.electricity += def.electricity;
        totals.water       += def.water;
        totals.waste       += def.waste;
        totals.happiness   += def.happiness;

        let (building_type, x, y) = (building.building_type.clone(), building.x, building.y);
        let deltas = apply_bonus(&building_type, state, &mut totals);
        if !deltas.is_empty() {
            report.feedback.push(BuildingFeedback { index, building_type, x, y, deltas });
        }
    }

    state.resources.money       += totals.money;
    state.resources.electricity += totals.electricity;
    state.resources.water       += totals.water;
    state.resources.waste        = (state.resources.waste + totals.waste).max(0.0);
    state.citizens              += totals.citizens;
    state.adjust_happiness(totals.happiness);

    report.totals = totals;
    report
}

/// Type-specific rules layered on top of the catalog deltas.
/// Returns the deltas worth showing to the player.
fn apply_bonus(
    building_type: &str,
    state: &mut GameState,
    totals: &mut TickTotals,
) -> Vec<ResourceDelta> {
    match building_type {
        "commercial" => {
            totals.money += COMMERCIAL_MONEY_BONUS;
            vec![ResourceDelta::new(Resource::Money, COMMERCIAL_MONEY_BONUS)]
        }
        "industrial" => {
            totals.electricity += INDUSTRIAL_ELECTRICITY_BONUS;
            vec![ResourceDelta::new(Resource::Electricity, INDUSTRIAL_ELECTRICITY_BONUS)]
        }
        "waterFactory" => {
            totals.water += WATER_FACTORY_WATER_BONUS;
            vec![ResourceDelta::new(Resource::Water, WATER_FACTORY_WATER_BONUS)]
        }
        "ecoCleaningService" => {
            totals.waste += ECO_CLEANING_WASTE_BONUS;
            vec![ResourceDelta::new(Resource::Waste, ECO_CLEANING_WASTE_BONUS)]
        }
        "solarPlant" => {
            totals.electricity += SOLAR_ELECTRICITY_BONUS;
            vec![ResourceDelta::new(Resource::Electricity, SOLAR_ELECTRICITY_BONUS)]
        }
        "residential" => {
            totals.citizens += RESIDENTIAL_CITIZEN_BONUS;
            let mut deltas = vec![ResourceDelta::new(
                Resource::Citizens,
                RESIDENTIAL_CITIZEN_BONUS as f64,
            )];
            let applied = apply_immediate_happiness(state, RESIDENTIAL_HAPPINESS_PENALTY);
            if applied != 0.0 {
                deltas.push(ResourceDelta::new(Resource::Happiness, applied));
            }
            deltas
        }
        "park" => {
            totals.happiness += PARK_HAPPINESS_BONUS;
            let mut deltas = vec![ResourceDelta::new(Resource::Happiness, PARK_HAPPINESS_BONUS)];
            if state.happiness < HAPPINESS_MAX {
                let applied = apply_immediate_happiness(state, PARK_HAPPINESS_TOP_UP);
                deltas.push(ResourceDelta::new(Resource::Happiness, applied));
            }
            deltas
        }
        _ => Vec::new(),
    }
}

/// Apply a clamped happiness change right away; returns what actually moved.
fn apply_immediate_happiness(state: &mut GameState, delta: f64) -> f64 {
    let before = state.happiness;
    state.adjust_happiness(delta);
    state.happiness - before
}
