//! JSON-lines IPC: one command per input line, one reply per output line.
//!
//! Mutating commands go through the engine's input queue and ticks go
//! through `SimEngine::step`, so pause and speed apply here the same way
//! they apply to the realtime scheduler.

use anyhow::Result;
use gridcity_core::{
    command::PlayerCommand,
    config::BuildingTypeDef,
    engine::{CommandOutcome, SimEngine},
    resolution::TickReport,
    snapshot::SNAPSHOT_KEY,
    state::{PlacedBuilding, ResourcePool},
    types::{Coord, Tick},
};
use std::io::{BufRead, Write};

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcCommand {
    GetState,
    Catalog,
    /// `count` scheduler steps; each step resolves as many ticks as the
    /// clock speed asks for, and none while paused.
    Tick {
        #[serde(default = "one")]
        count: u64,
    },
    Place {
        building_type: String,
        x: f64,
        y: f64,
    },
    Preview {
        building_type: String,
        x: f64,
        y: f64,
    },
    Command {
        command: PlayerCommand,
    },
    Quit,
}

fn one() -> u64 {
    1
}

#[derive(serde::Serialize)]
pub struct UiState<'a> {
    tick:      Tick,
    paused:    bool,
    resources: &'a ResourcePool,
    citizens:  i64,
    happiness: f64,
    buildings: &'a [PlacedBuilding],
    saved_at:  Option<String>,
}

#[derive(serde::Serialize)]
struct TickReply<'a> {
    state:   UiState<'a>,
    reports: Vec<TickReport>,
}

#[derive(serde::Serialize)]
struct CommandReply<'a> {
    state:   UiState<'a>,
    outcome: CommandOutcome,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum PreviewReply {
    Valid { x: Coord, y: Coord },
    Invalid { error: String },
}

pub fn run_loop(engine: &mut SimEngine, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                writeln!(output, "{}", serde_json::json!({ "error": e.to_string() }))?;
                output.flush()?;
                continue;
            }
        };

        match handle(engine, cmd)? {
            Some(reply) => writeln!(output, "{reply}")?,
            None => break,
        }
        output.flush()?;
    }
    Ok(())
}

/// Apply one command and render its reply. `None` means quit.
pub fn handle(engine: &mut SimEngine, cmd: IpcCommand) -> Result<Option<String>> {
    let reply = match cmd {
        IpcCommand::Quit => return Ok(None),
        IpcCommand::GetState => serde_json::to_string(&ui_state(engine)?)?,
        IpcCommand::Catalog => {
            let defs: Vec<&BuildingTypeDef> = engine.catalog().iter().collect();
            serde_json::to_string(&defs)?
        }
        IpcCommand::Tick { count } => {
            let mut reports = Vec::new();
            for _ in 0..count {
                reports.extend(engine.step()?);
            }
            serde_json::to_string(&TickReply { state: ui_state(engine)?, reports })?
        }
        IpcCommand::Preview { building_type, x, y } => {
            let reply = match engine.preview(&building_type, x, y) {
                Ok((x, y)) => PreviewReply::Valid { x, y },
                Err(e) => PreviewReply::Invalid { error: e.to_string() },
            };
            serde_json::to_string(&reply)?
        }
        IpcCommand::Place { building_type, x, y } => {
            let outcome = enqueue(engine, PlayerCommand::PlaceBuilding { building_type, x, y })?;
            serde_json::to_string(&CommandReply { state: ui_state(engine)?, outcome })?
        }
        IpcCommand::Command { command } => {
            let outcome = enqueue(engine, command)?;
            serde_json::to_string(&CommandReply { state: ui_state(engine)?, outcome })?
        }
    };
    Ok(Some(reply))
}

/// Submit to the input queue and drain it, replying with this command's outcome.
fn enqueue(engine: &mut SimEngine, command: PlayerCommand) -> Result<CommandOutcome> {
    engine.submit(command);
    let outcomes = engine.process_commands()?;
    outcomes
        .into_iter()
        .last()
        .ok_or_else(|| anyhow::anyhow!("input queue drained without an outcome"))
}

pub fn ui_state(engine: &SimEngine) -> Result<UiState<'_>> {
    let state = engine.state();
    Ok(UiState {
        tick:      engine.clock.current_tick,
        paused:    engine.clock.paused,
        resources: &state.resources,
        citizens:  state.citizens,
        happiness: state.happiness,
        buildings: &state.buildings,
        saved_at:  engine.store().saved_at(SNAPSHOT_KEY)?,
    })
}
