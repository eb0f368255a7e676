//! GridCity core — the simulation and persistence engine of a tile-based
//! city builder.
//!
//! The presentation layer reads `SimEngine::state()` and feeds placements
//! in; the scheduler calls `SimEngine::tick()`. Everything else is internal.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod placement;
pub mod resolution;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod types;
