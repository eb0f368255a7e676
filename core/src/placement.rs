//! Placement engine — validates and applies one building placement.
//!
//! A placement either fully succeeds (one building appended, cost debited)
//! or fails without touching the state. Persisting the result is the
//! engine's job, not this module's.

use crate::{
    config::{BuildingCatalog, BuildingTypeDef},
    error::PlacementError,
    state::{GameState, PlacedBuilding},
    types::{snap_to_grid, Coord},
};

/// A placement request as forwarded by the presentation layer.
/// Coordinates are raw pointer positions in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest<'a> {
    pub building_type: &'a str,
    pub click_x:       f64,
    pub click_y:       f64,
}

impl PlacementRequest<'_> {
    /// The grid cell this request lands on.
    pub fn cell(&self) -> Result<(Coord, Coord), PlacementError> {
        match (snap_to_grid(self.click_x), snap_to_grid(self.click_y)) {
            (Some(gx), Some(gy)) => Ok((gx, gy)),
            _ => Err(PlacementError::OutOfBounds { x: self.click_x, y: self.click_y }),
        }
    }
}

/// Check whether `request` could be placed, without mutating anything.
/// Returns the snapped grid cell on success.
pub fn validate(
    state: &GameState,
    request: &PlacementRequest<'_>,
    catalog: &BuildingCatalog,
) -> Result<(Coord, Coord), PlacementError> {
    check(state, request, catalog).map(|(_, cell)| cell)
}

/// Place a building: snap to grid, check the catalog, funds and cell,
/// then append and debit.
pub fn place(
    state: &mut GameState,
    request: &PlacementRequest<'_>,
    catalog: &BuildingCatalog,
) -> Result<PlacedBuilding, PlacementError> {
    let (def, (gx, gy)) = check(state, request, catalog)?;

    let building = PlacedBuilding {
        building_type: def.building_type.clone(),
        x:             gx,
        y:             gy,
        color:         def.color.clone(),
    };
    state.buildings.push(building.clone());
    state.resources.money -= def.cost;

    Ok(building)
}

fn check<'c>(
    state: &GameState,
    request: &PlacementRequest<'_>,
    catalog: &'c BuildingCatalog,
) -> Result<(&'c BuildingTypeDef, (Coord, Coord)), PlacementError> {
    let (gx, gy) = request.cell()?;

    let def = catalog
        .get(request.building_type)
        .ok_or_else(|| PlacementError::UnknownBuildingType {
            building_type: request.building_type.to_string(),
        })?;

    if state.resources.money < def.cost {
        return Err(PlacementError::InsufficientFunds {
            cost:      def.cost,
            available: state.resources.money,
        });
    }

    if state.is_occupied(gx, gy) {
        return Err(PlacementError::CellOccupied { x: gx, y: gy });
    }

    Ok((def, (gx, gy)))
}
