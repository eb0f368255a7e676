//! State store tests — load/save contract, merge with defaults,
//! corrupt snapshot recovery, and file-backed restarts.

use gridcity_core::{
    config::SimConfig,
    engine::SimEngine,
    snapshot::SNAPSHOT_KEY,
    state::{GameState, PlacedBuilding},
    store::SimStore,
};
use std::path::PathBuf;

fn store() -> SimStore {
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

/// Unique database path under the OS temp dir, cleared before use.
fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "gridcity_{name}_{}.db",
        std::process::id()
    ));
    remove_db(&path);
    path
}

fn remove_db(path: &PathBuf) {
    let base = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{base}{suffix}"));
    }
}

#[test]
fn empty_store_loads_defaults() {
    let store = store();
    assert_eq!(store.load_game_state().unwrap(), GameState::default());
}

#[test]
fn default_state_matches_starting_values() {
    let state = GameState::default();
    assert_eq!(state.resources.money, 1000.0);
    assert_eq!(state.resources.electricity, 100.0);
    assert_eq!(state.resources.water, 100.0);
    assert_eq!(state.resources.waste, 0.0);
    assert_eq!(state.citizens, 100);
    assert_eq!(state.happiness, 75.0);
    assert!(state.buildings.is_empty());
}

#[test]
fn save_then_load_is_identity_for_reachable_states() {
    let mut engine = SimEngine::build_test("roundtrip".into()).unwrap();
    engine.place("residential", 10.0, 10.0).unwrap();
    engine.place("park", 60.0, 10.0).unwrap();
    engine.place("commercial", 110.0, 10.0).unwrap();
    engine.place("ecoCleaningService", 160.0, 10.0).unwrap();

    for _ in 0..7 {
        engine.tick().unwrap();
        let loaded = engine.store().load_game_state().unwrap();
        assert_eq!(&loaded, engine.state());
    }
}

#[test]
fn save_replaces_the_previous_snapshot() {
    let store = store();
    let mut state = GameState::default();
    store.save_game_state(&state).unwrap();

    state.resources.money = 42.5;
    state.buildings.push(PlacedBuilding {
        building_type: "park".into(),
        x:             0,
        y:             50,
        color:         "green".into(),
    });
    store.save_game_state(&state).unwrap();

    assert_eq!(store.load_game_state().unwrap(), state);
}

#[test]
fn corrupt_snapshot_falls_back_to_defaults() {
    let store = store();
    store.put(SNAPSHOT_KEY, "{ this is not json").unwrap();
    assert_eq!(store.load_game_state().unwrap(), GameState::default());

    store.put(SNAPSHOT_KEY, r#"{"buildings": "nope"}"#).unwrap();
    assert_eq!(store.load_game_state().unwrap(), GameState::default());
}

#[test]
fn partial_snapshot_keeps_defaults_for_absent_fields() {
    let store = store();
    store
        .put(
            SNAPSHOT_KEY,
            r#"{"resources": {"money": 640, "waste": 12}, "happiness": 55.5}"#,
        )
        .unwrap();

    let state = store.load_game_state().unwrap();

    assert_eq!(state.resources.money, 640.0);
    assert_eq!(state.resources.waste, 12.0);
    assert_eq!(state.resources.electricity, 100.0);
    assert_eq!(state.resources.water, 100.0);
    assert_eq!(state.citizens, 100);
    assert_eq!(state.happiness, 55.5);
    assert!(state.buildings.is_empty());
}

#[test]
fn unknown_snapshot_fields_are_ignored() {
    let store = store();
    store
        .put(SNAPSHOT_KEY, r#"{"citizens": 321, "weather": "rain"}"#)
        .unwrap();

    let state = store.load_game_state().unwrap();
    assert_eq!(state.citizens, 321);
}

#[test]
fn restored_happiness_and_waste_are_brought_back_in_range() {
    let store = store();
    store
        .put(SNAPSHOT_KEY, r#"{"happiness": 250, "resources": {"waste": -40}}"#)
        .unwrap();
    let state = store.load_game_state().unwrap();
    assert_eq!(state.happiness, 100.0);
    assert_eq!(state.resources.waste, 0.0);

    store.put(SNAPSHOT_KEY, r#"{"happiness": -3.5}"#).unwrap();
    assert_eq!(store.load_game_state().unwrap().happiness, 0.0);
}

#[test]
fn restored_buildings_off_grid_or_sharing_a_cell_are_dropped() {
    let store = store();
    store
        .put(
            SNAPSHOT_KEY,
            r#"{"buildings": [
                {"type": "park", "x": 7, "y": 7, "color": "green"},
                {"type": "park", "x": 7, "y": 7, "color": "green"},
                {"type": "residential", "x": 50, "y": 100, "color": "gray"},
                {"type": "commercial", "x": 50, "y": 100, "color": "gray"},
                {"type": "solarPlant", "x": 0, "y": 0, "color": "goldenrod"}
            ]}"#,
        )
        .unwrap();

    let state = store.load_game_state().unwrap();

    let kept: Vec<_> = state
        .buildings
        .iter()
        .map(|b| (b.building_type.as_str(), b.x, b.y))
        .collect();
    assert_eq!(kept, vec![("residential", 50, 100), ("solarPlant", 0, 0)]);
}

#[test]
fn engine_opened_on_an_out_of_range_save_respects_the_rules() {
    let store = store();
    store
        .put(
            SNAPSHOT_KEY,
            r#"{"happiness": 250, "resources": {"waste": -40},
                "buildings": [{"type": "park", "x": 7, "y": 7, "color": "green"},
                              {"type": "park", "x": 7, "y": 7, "color": "green"}]}"#,
        )
        .unwrap();

    let mut engine = SimEngine::open("sanitized".into(), SimConfig::default_test(), store).unwrap();
    assert!((0.0..=100.0).contains(&engine.state().happiness));
    assert!(engine.state().resources.waste >= 0.0);
    assert!(engine.state().buildings.is_empty());

    engine.place("park", 7.0, 7.0).unwrap();
    assert_eq!(engine.state().buildings.len(), 1);
}

#[test]
fn clearing_storage_resets_to_defaults() {
    let store = store();
    let mut state = GameState::default();
    state.citizens = 999;
    store.save_game_state(&state).unwrap();

    store.clear_game_state().unwrap();

    assert_eq!(store.get(SNAPSHOT_KEY).unwrap(), None);
    assert_eq!(store.load_game_state().unwrap(), GameState::default());
}

#[test]
fn saved_at_is_stamped_on_save() {
    let store = store();
    assert_eq!(store.saved_at(SNAPSHOT_KEY).unwrap(), None);
    store.save_game_state(&GameState::default()).unwrap();
    assert!(store.saved_at(SNAPSHOT_KEY).unwrap().is_some());
}

#[test]
fn game_survives_a_restart_on_disk() {
    let path = temp_db("restart");
    let db = path.to_string_lossy().to_string();

    let expected = {
        let store = SimStore::open(&db).unwrap();
        store.migrate().unwrap();
        let mut engine = SimEngine::open("first".into(), SimConfig::default_test(), store).unwrap();
        engine.place("solarPlant", 0.0, 0.0).unwrap();
        engine.place("residential", 50.0, 0.0).unwrap();
        engine.run_ticks(3).unwrap();
        engine.state().clone()
    };

    let store = SimStore::open(&db).unwrap();
    store.migrate().unwrap();
    let engine = SimEngine::open("second".into(), SimConfig::default_test(), store).unwrap();

    assert_eq!(engine.state(), &expected);
    assert_eq!(engine.state().buildings.len(), 2);

    drop(engine);
    remove_db(&path);
}
