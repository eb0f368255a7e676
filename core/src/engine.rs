//! The simulation engine — owns the one and only GameState.
//!
//! ENTRY POINTS (the only ways state changes):
//!   1. place()  — a player placement, from the input queue or directly
//!   2. tick()   — one pass of the resolution engine, from the scheduler
//!
//! RULES:
//!   - Every entry point runs to completion; `&mut self` rules out interleaving.
//!   - Every successful mutation is saved, together with its events, in one
//!     transaction before memory changes; a failed save leaves the engine as it was.
//!   - Every outcome, including rejections, is recorded in the event log.

use crate::{
    clock::SimClock,
    command::{PlayerCommand, QueuedCommand},
    config::{BuildingCatalog, SimConfig},
    error::{PlacementError, SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    placement::{self, PlacementRequest},
    resolution::{self, TickReport},
    state::{GameState, PlacedBuilding},
    store::SimStore,
    types::{Coord, RunId, Tick},
};
use serde::Serialize;
use std::collections::VecDeque;

/// What applying one player command did.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Placed { building: PlacedBuilding },
    Rejected { reason: String },
    ClockUpdated { paused: bool },
}

pub struct SimEngine {
    pub run_id: RunId,
    pub clock:  SimClock,
    config:     SimConfig,
    state:      GameState,
    store:      SimStore,
    queue:      VecDeque<QueuedCommand>,
}

impl SimEngine {
    /// Start a run against `store`, restoring any saved game in it.
    /// The store must already be migrated.
    pub fn open(run_id: RunId, config: SimConfig, store: SimStore) -> SimResult<Self> {
        store.insert_run(&run_id, env!("CARGO_PKG_VERSION"))?;
        let state = store.load_game_state()?;

        let engine = Self {
            clock: SimClock::new(config.settings.tick_interval_ms),
            config,
            state,
            store,
            queue: VecDeque::new(),
            run_id,
        };
        engine.record(0, &SimEvent::RunStarted {
            run_id:         engine.run_id.clone(),
            building_count: engine.state.buildings.len(),
        })?;
        log::info!(
            "Run {} started: {} building types, {} buildings on the grid",
            engine.run_id,
            engine.config.catalog.len(),
            engine.state.buildings.len()
        );
        Ok(engine)
    }

    /// Engine over a fresh in-memory store with the test catalog.
    pub fn build_test(run_id: RunId) -> SimResult<Self> {
        Self::build_test_with_config(run_id, SimConfig::default_test())
    }

    pub fn build_test_with_config(run_id: RunId, config: SimConfig) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Self::open(run_id, config, store)
    }

    /// Read-only view for rendering.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.config.catalog
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    /// Shut the engine down and hand back its store, e.g. to reopen the
    /// saved game under a different catalog.
    pub fn into_store(self) -> SimStore {
        self.store
    }

    /// Check where a placement would land without applying it.
    /// Used by the presentation layer to highlight the hovered cell.
    pub fn preview(&self, building_type: &str, x: f64, y: f64) -> Result<(Coord, Coord), PlacementError> {
        let request = PlacementRequest { building_type, click_x: x, click_y: y };
        placement::validate(&self.state, &request, &self.config.catalog)
    }

    /// Place a building at raw pointer coordinates.
    ///
    /// The placement is applied to a copy; memory only changes once the
    /// snapshot and its event are committed.
    pub fn place(&mut self, building_type: &str, x: f64, y: f64) -> SimResult<PlacedBuilding> {
        let tick = self.clock.current_tick;
        let request = PlacementRequest { building_type, click_x: x, click_y: y };

        let mut next = self.state.clone();
        let building = match placement::place(&mut next, &request, &self.config.catalog) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("tick={tick} placement: {building_type} at ({x}, {y}) rejected: {e}");
                self.record(tick, &SimEvent::rejected(tick, building_type, &e))?;
                return Err(SimError::Placement(e));
            }
        };

        let cost = self.state.resources.money - next.resources.money;
        let placed = self.entry(tick, &SimEvent::BuildingPlaced {
            tick,
            building_type: building.building_type.clone(),
            x:             building.x,
            y:             building.y,
            cost,
            money_after:   next.resources.money,
        })?;
        self.store.commit_game_state(&next, &[placed])?;
        self.state = next;

        log::info!(
            "tick={tick} placement: {} at ({}, {}), money now {}",
            building.building_type,
            building.x,
            building.y,
            self.state.resources.money
        );

        Ok(building)
    }

    /// Advance one tick. This is the core simulation step.
    ///
    /// Resolution runs on a copy; the clock and memory only move once the
    /// snapshot and the tick's events are committed.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        let tick = self.clock.current_tick + 1;

        let mut next = self.state.clone();
        let report = resolution::resolve_tick(&mut next, &self.config.catalog);

        let mut entries = Vec::with_capacity(report.skipped.len() + 1);
        for skipped in &report.skipped {
            entries.push(self.entry(tick, &SimEvent::BuildingSkipped {
                tick,
                building: skipped.clone(),
            })?);
        }
        entries.push(self.entry(tick, &SimEvent::TickResolved {
            tick,
            totals:    report.totals.clone(),
            happiness: next.happiness,
            citizens:  next.citizens,
        })?);
        self.store.commit_game_state(&next, &entries)?;

        self.state = next;
        self.clock.advance();

        log::debug!(
            "tick={tick} resolved: money={} elec={} water={} waste={} citizens={} happiness={:.1}",
            self.state.resources.money,
            self.state.resources.electricity,
            self.state.resources.water,
            self.state.resources.waste,
            self.state.citizens,
            self.state.happiness
        );

        Ok(report)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    /// One scheduler step: pending commands first, then as many ticks as
    /// the clock speed asks for. A paused clock resolves no ticks.
    pub fn step(&mut self) -> SimResult<Vec<TickReport>> {
        self.process_commands()?;
        if self.clock.paused {
            return Ok(Vec::new());
        }
        (0..self.clock.ticks_per_step()).map(|_| self.tick()).collect()
    }

    /// Queue a command for the next step. Returns its command id.
    pub fn submit(&mut self, command: PlayerCommand) -> String {
        let queued = QueuedCommand::new(self.clock.current_tick, command);
        let id = queued.command_id.clone();
        self.queue.push_back(queued);
        id
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Apply every queued command in submission order.
    pub fn process_commands(&mut self) -> SimResult<Vec<CommandOutcome>> {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(queued) = self.queue.pop_front() {
            log::debug!(
                "tick={} applying command {} queued at tick {}",
                self.clock.current_tick,
                queued.command_id,
                queued.queued_at
            );
            outcomes.push(self.apply(queued.command)?);
        }
        Ok(outcomes)
    }

    /// Apply one command immediately. Placement rejections are outcomes,
    /// not errors; only storage failures propagate.
    pub fn apply(&mut self, command: PlayerCommand) -> SimResult<CommandOutcome> {
        match command {
            PlayerCommand::Pause => {
                self.clock.pause();
                Ok(CommandOutcome::ClockUpdated { paused: true })
            }
            PlayerCommand::Resume => {
                self.clock.resume();
                Ok(CommandOutcome::ClockUpdated { paused: false })
            }
            PlayerCommand::SetSpeed { speed } => {
                self.clock.set_speed(speed);
                Ok(CommandOutcome::ClockUpdated { paused: self.clock.paused })
            }
            PlayerCommand::PlaceBuilding { building_type, x, y } => {
                match self.place(&building_type, x, y) {
                    Ok(building) => Ok(CommandOutcome::Placed { building }),
                    Err(SimError::Placement(e)) => {
                        Ok(CommandOutcome::Rejected { reason: e.to_string() })
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Query events for a specific tick from the store.
    pub fn events_for_tick(&self, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(&self.run_id, tick)
    }

    fn record(&self, tick: Tick, event: &SimEvent) -> SimResult<()> {
        let entry = self.entry(tick, event)?;
        self.store.append_event(&entry)
    }

    fn entry(&self, tick: Tick, event: &SimEvent) -> SimResult<EventLogEntry> {
        Ok(EventLogEntry {
            id:      None,
            run_id:  self.run_id.clone(),
            tick,
            kind:    event.kind().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }
}
