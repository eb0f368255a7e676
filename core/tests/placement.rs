//! Placement engine tests — snapping, funds, catalog lookups, cell exclusivity.

use gridcity_core::{
    config::{BuildingCatalog, SimConfig},
    error::PlacementError,
    placement::{place, PlacementRequest},
    state::GameState,
    types::snap_to_grid,
};

fn request(building_type: &str, x: f64, y: f64) -> PlacementRequest<'_> {
    PlacementRequest { building_type, click_x: x, click_y: y }
}

#[test]
fn placement_debits_cost_and_appends_one_snapped_building() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();

    let placed = place(&mut state, &request("commercial", 10.0, 10.0), &config.catalog).unwrap();

    assert_eq!(state.resources.money, 900.0);
    assert_eq!(state.buildings.len(), 1);
    assert_eq!((placed.x, placed.y), (0, 0));
    assert_eq!(state.buildings[0], placed);
    assert_eq!(placed.building_type, "commercial");
    assert_eq!(placed.color, "gray");
}

#[test]
fn insufficient_funds_mutates_nothing() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();
    state.resources.money = 99.0;
    let before = state.clone();

    let err = place(&mut state, &request("park", 120.0, 40.0), &config.catalog).unwrap_err();

    assert_eq!(err, PlacementError::InsufficientFunds { cost: 100.0, available: 99.0 });
    assert_eq!(state, before);
}

#[test]
fn money_equal_to_cost_is_enough() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();
    state.resources.money = 100.0;

    place(&mut state, &request("park", 0.0, 0.0), &config.catalog).unwrap();

    assert_eq!(state.resources.money, 0.0);
    assert_eq!(state.buildings.len(), 1);
}

#[test]
fn clicks_anywhere_in_a_cell_snap_to_its_origin() {
    for coord in [50.0, 50.5, 73.2, 99.0, 99.999] {
        assert_eq!(snap_to_grid(coord), Some(50), "coord {coord} should snap to 50");
    }
    assert_eq!(snap_to_grid(0.0), Some(0));
    assert_eq!(snap_to_grid(49.99), Some(0));
    assert_eq!(snap_to_grid(100.0), Some(100));
    assert_eq!(snap_to_grid(-10.0), Some(-50));
}

#[test]
fn unrepresentable_coordinates_do_not_snap() {
    for coord in [1e300, -1e300, f64::INFINITY, f64::NEG_INFINITY, f64::NAN, 9.3e18] {
        assert_eq!(snap_to_grid(coord), None, "coord {coord} should not snap");
    }
}

#[test]
fn out_of_range_click_is_rejected_without_mutation() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();

    let err = place(&mut state, &request("park", 1e300, 0.0), &config.catalog).unwrap_err();
    assert!(matches!(err, PlacementError::OutOfBounds { .. }));

    let err = place(&mut state, &request("park", 10.0, f64::NAN), &config.catalog).unwrap_err();
    assert!(matches!(err, PlacementError::OutOfBounds { .. }));

    assert_eq!(state, GameState::default());
}

#[test]
fn placed_coordinates_are_multiples_of_the_cell_size() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();

    for (i, (x, y)) in [(13.0, 260.7), (451.2, 99.9), (777.0, 3.0)].into_iter().enumerate() {
        let placed = place(&mut state, &request("residential", x, y), &config.catalog).unwrap();
        assert_eq!(placed.x % 50, 0, "placement {i}");
        assert_eq!(placed.y % 50, 0, "placement {i}");
    }
    assert_eq!(state.buildings.len(), 3);
    assert_eq!(state.resources.money, 700.0);
}

#[test]
fn unknown_type_is_rejected_without_mutation() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();

    let err = place(&mut state, &request("casino", 0.0, 0.0), &config.catalog).unwrap_err();

    assert_eq!(
        err,
        PlacementError::UnknownBuildingType { building_type: "casino".into() }
    );
    assert_eq!(state, GameState::default());
}

#[test]
fn empty_catalog_rejects_every_placement() {
    let catalog = BuildingCatalog::empty();
    let mut state = GameState::default();

    for building_type in ["residential", "park", "solarPlant"] {
        let err = place(&mut state, &request(building_type, 0.0, 0.0), &catalog).unwrap_err();
        assert!(matches!(err, PlacementError::UnknownBuildingType { .. }));
    }
    assert!(state.buildings.is_empty());
    assert_eq!(state.resources.money, 1000.0);
}

#[test]
fn occupied_cell_is_rejected() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();

    place(&mut state, &request("park", 60.0, 60.0), &config.catalog).unwrap();
    let before = state.clone();

    let err = place(&mut state, &request("industrial", 95.0, 51.0), &config.catalog).unwrap_err();

    assert_eq!(err, PlacementError::CellOccupied { x: 50, y: 50 });
    assert_eq!(state, before);
}

#[test]
fn buildings_keep_insertion_order() {
    let config = SimConfig::default_test();
    let mut state = GameState::default();

    place(&mut state, &request("park", 200.0, 0.0), &config.catalog).unwrap();
    place(&mut state, &request("residential", 0.0, 0.0), &config.catalog).unwrap();
    place(&mut state, &request("commercial", 100.0, 0.0), &config.catalog).unwrap();

    let order: Vec<_> = state.buildings.iter().map(|b| b.building_type.as_str()).collect();
    assert_eq!(order, vec!["park", "residential", "commercial"]);
}
