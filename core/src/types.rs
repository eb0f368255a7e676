//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one pass of the resolution engine.
pub type Tick = u64;

/// The canonical run identifier. Tags event log rows for one process lifetime.
pub type RunId = String;

/// A building type identifier, as keyed in the catalog (e.g. "residential").
pub type BuildingType = String;

/// A grid-aligned coordinate in canvas units.
pub type Coord = i64;

/// Side length of one grid cell, in canvas units.
pub const CELL_SIZE: Coord = 50;

/// Snap a raw pointer coordinate down to the origin of its grid cell.
///
/// `floor(coord / CELL_SIZE) * CELL_SIZE`, so negative coordinates snap
/// towards negative infinity rather than towards zero. Returns `None` for
/// non-finite input or a cell origin that does not fit in a `Coord`.
pub fn snap_to_grid(coord: f64) -> Option<Coord> {
    if !coord.is_finite() {
        return None;
    }
    let cell = (coord / CELL_SIZE as f64).floor();
    if cell < (Coord::MIN / CELL_SIZE) as f64 || cell > (Coord::MAX / CELL_SIZE) as f64 {
        return None;
    }
    (cell as Coord).checked_mul(CELL_SIZE)
}
