//! city-runner: headless driver for the GridCity engine.
//!
//! Stands in for the presentation layer: a fixed-rate scheduler for ticks
//! and a JSON-lines input queue for placements.
//!
//! Usage:
//!   city-runner --ticks 60 --db city.db
//!   city-runner --ticks 60 --db city.db --realtime
//!   city-runner --db city.db --ipc-mode

use anyhow::Result;
use gridcity_core::{
    config::SimConfig,
    engine::SimEngine,
    snapshot::SNAPSHOT_KEY,
    store::SimStore,
};
use std::env;
use std::io;

mod ipc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 30u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let realtime = args.iter().any(|a| a == "--realtime");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    if !ipc_mode {
        println!("GridCity — city-runner");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  realtime:  {realtime}");
        println!();
    }

    let config = SimConfig::load(data_dir)?;
    let store = SimStore::open(db)?;
    store.migrate()?;

    let run_id = format!("run-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f"));
    let mut engine = SimEngine::open(run_id, config, store)?;

    if ipc_mode {
        ipc::run_loop(&mut engine, io::stdin().lock(), io::stdout())?;
    } else if realtime {
        run_scheduler(&mut engine, ticks)?;
        print_summary(&engine, ticks)?;
    } else {
        engine.run_ticks(ticks)?;
        print_summary(&engine, ticks)?;
    }

    Ok(())
}

/// Fixed-rate scheduler: one engine step per tick interval until `ticks`
/// ticks have been resolved.
fn run_scheduler(engine: &mut SimEngine, ticks: u64) -> Result<()> {
    let interval = engine.clock.tick_interval();
    let target = engine.clock.current_tick + ticks;
    while engine.clock.current_tick < target {
        let started = std::time::Instant::now();
        let reports = engine.step()?;
        let popups: usize = reports.iter().map(|r| r.feedback.len()).sum();
        log::debug!(
            "scheduler: {} ticks resolved, {popups} feedback entries",
            reports.len()
        );
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    Ok(())
}

fn print_summary(engine: &SimEngine, ticks: u64) -> Result<()> {
    let state = engine.state();
    let placed = engine.store().event_count(&engine.run_id, "building_placed")?;
    let skipped = engine.store().event_count(&engine.run_id, "building_skipped")?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", engine.run_id);
    println!("  ticks run:      {ticks}");
    println!("  final tick:     {}", engine.clock.current_tick);
    println!("  buildings:      {}", state.buildings.len());
    println!("  placed (run):   {placed}");
    println!("  skipped (run):  {skipped}");
    println!();
    println!("=== RESOURCES ===");
    println!("  money:          {:.1}", state.resources.money);
    println!("  electricity:    {:.1}", state.resources.electricity);
    println!("  water:          {:.1}", state.resources.water);
    println!("  waste:          {:.1}", state.resources.waste);
    println!("  citizens:       {}", state.citizens);
    println!("  happiness:      {:.1}", state.happiness);

    println!();
    println!("=== BUILDINGS BY TYPE ===");
    if state.buildings.is_empty() {
        println!("  (No buildings placed yet)");
    } else {
        for def in engine.catalog().iter() {
            let count = state.count_of(&def.building_type);
            if count > 0 {
                println!("  {:<20} {count}", def.building_type);
            }
        }
    }
    if let Some(saved_at) = engine.store().saved_at(SNAPSHOT_KEY)? {
        println!();
        println!("  last saved:     {saved_at}");
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
