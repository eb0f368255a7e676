use crate::types::BuildingType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the building catalog. Deltas are applied once per tick
/// for every placed building of this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingTypeDef {
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub cost:          f64,
    pub color:         String,
    #[serde(default)]
    pub electricity:   f64,
    #[serde(default)]
    pub water:         f64,
    #[serde(default)]
    pub waste:         f64,
    #[serde(default)]
    pub happiness:     f64,
}

#[derive(Debug, Clone, Deserialize)]
struct BuildingCatalogFile {
    buildings: Vec<BuildingTypeDef>,
}

/// Immutable lookup table of building definitions, keyed by type.
/// Catalog order is kept separately for listing.
#[derive(Debug, Clone, Default)]
pub struct BuildingCatalog {
    by_type: HashMap<BuildingType, BuildingTypeDef>,
    order:   Vec<BuildingType>,
}

impl BuildingCatalog {
    /// Build a catalog from definitions. Type ids must be unique.
    pub fn from_defs(defs: Vec<BuildingTypeDef>) -> anyhow::Result<Self> {
        let mut catalog = Self::default();
        for def in defs {
            if catalog.by_type.contains_key(&def.building_type) {
                anyhow::bail!("Duplicate building type '{}' in catalog", def.building_type);
            }
            catalog.order.push(def.building_type.clone());
            catalog.by_type.insert(def.building_type.clone(), def);
        }
        Ok(catalog)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, building_type: &str) -> Option<&BuildingTypeDef> {
        self.by_type.get(building_type)
    }

    pub fn contains(&self, building_type: &str) -> bool {
        self.by_type.contains_key(building_type)
    }

    /// Definitions in catalog file order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildingTypeDef> {
        self.order.iter().filter_map(|t| self.by_type.get(t))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop a definition. Buildings already placed with this type stay on
    /// the grid and contribute nothing until it comes back.
    pub fn remove(&mut self, building_type: &str) -> Option<BuildingTypeDef> {
        self.order.retain(|t| t != building_type);
        self.by_type.remove(building_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimSettings {
    /// Wall-clock spacing between scheduler steps.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for SimSettings {
    fn default() -> Self {
        Self { tick_interval_ms: default_tick_interval_ms() }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub catalog:  BuildingCatalog,
    /// Events catalog. Loaded and carried, not yet interpreted by the engine.
    pub events:   Vec<serde_json::Value>,
    pub settings: SimSettings,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// `buildings.json` is required; `events.json` and `settings.json` are optional.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/buildings.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: BuildingCatalogFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        let catalog = BuildingCatalog::from_defs(file.buildings)?;

        let events_path = format!("{data_dir}/events.json");
        let events = match std::fs::read_to_string(&events_path) {
            Ok(content) => {
                let file: EventsFile = serde_json::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Cannot parse {events_path}: {e}"))?;
                file.events
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => anyhow::bail!("Cannot read {events_path}: {e}"),
        };

        let settings_path = format!("{data_dir}/settings.json");
        let settings = match std::fs::read_to_string(&settings_path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse {settings_path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SimSettings::default(),
            Err(e) => anyhow::bail!("Cannot read {settings_path}: {e}"),
        };

        log::info!(
            "Loaded {} building types and {} events from {data_dir}",
            catalog.len(),
            events.len()
        );

        Ok(Self { catalog, events, settings })
    }

    /// Wrap an arbitrary catalog with default settings and no events.
    pub fn with_catalog(catalog: BuildingCatalog) -> Self {
        Self {
            catalog,
            events:   Vec::new(),
            settings: SimSettings::default(),
        }
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Mirrors data/buildings.json.
    pub fn default_test() -> Self {
        let def = |building_type: &str, cost: f64, color: &str, deltas: [f64; 4]| BuildingTypeDef {
            building_type: building_type.into(),
            cost,
            color:         color.into(),
            electricity:   deltas[0],
            water:         deltas[1],
            waste:         deltas[2],
            happiness:     deltas[3],
        };

        // electricity, water, waste, happiness
        let defs = vec![
            def("residential",        100.0, "gray",      [-5.0, -5.0,  2.0,  0.0]),
            def("commercial",         100.0, "gray",      [-5.0, -2.0,  1.0,  0.0]),
            def("industrial",         100.0, "gray",      [ 0.0, -5.0,  5.0, -1.0]),
            def("park",               100.0, "green",     [ 0.0, -1.0,  0.0,  0.0]),
            def("waterFactory",       100.0, "blue",      [-5.0,  0.0,  1.0,  0.0]),
            def("ecoCleaningService", 100.0, "teal",      [-2.0, -1.0,  0.0,  0.0]),
            def("solarPlant",         100.0, "goldenrod", [ 0.0,  0.0,  0.0,  0.0]),
        ];

        Self::with_catalog(
            BuildingCatalog::from_defs(defs).expect("built-in test catalog has unique types"),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EventsFile {
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_types_are_rejected() {
        let def = BuildingTypeDef {
            building_type: "park".into(),
            cost:          100.0,
            color:         "green".into(),
            electricity:   0.0,
            water:         0.0,
            waste:         0.0,
            happiness:     0.0,
        };
        let err = BuildingCatalog::from_defs(vec![def.clone(), def]).unwrap_err();
        assert!(err.to_string().contains("park"));
    }

    #[test]
    fn missing_deltas_default_to_zero() {
        let json = r#"{"type": "commercial", "cost": 100, "color": "gray"}"#;
        let def: BuildingTypeDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.electricity, 0.0);
        assert_eq!(def.happiness, 0.0);
    }

    #[test]
    fn iteration_follows_catalog_order() {
        let config = SimConfig::default_test();
        let first: Vec<_> = config.catalog.iter().take(2).map(|d| d.building_type.as_str()).collect();
        assert_eq!(first, vec!["residential", "commercial"]);
    }

    #[test]
    fn built_in_test_catalog_has_all_seven_types() {
        let config = SimConfig::default_test();
        assert_eq!(config.catalog.iter().count(), 7);
        for t in ["residential", "commercial", "industrial", "park", "waterFactory", "ecoCleaningService", "solarPlant"] {
            assert!(config.catalog.get(t).is_some(), "{t} missing");
        }
    }
}
