//! Locating a boundary cell from an interior seed.

use crate::grid::RegionGrid;
use crate::orientation::{Direction, Orientation};
use crate::trace::TraceError;
use crate::types::Cell;

/// Axis the seed scan walks along. The tracer starts facing this way.
pub const SCAN_ORIENTATION: Orientation = Orientation::PLUS_X;

/// Walk from `seed` along [`SCAN_ORIENTATION`] to the last in-region
/// cell of the scanline run.
///
/// The cell one step further is either off the grid or not in the
/// region, so the returned cell touches the boundary on that side.
///
/// # Errors
///
/// Returns [`TraceError::InvalidSeed`] if `seed` itself is not in the
/// region.
pub fn locate_boundary_seed<G: RegionGrid + ?Sized>(
    grid: &G,
    seed: Cell,
) -> Result<Cell, TraceError> {
    if !grid.in_region(seed) {
        return Err(TraceError::InvalidSeed { cell: seed });
    }

    let mut cell = seed;
    loop {
        let next = cell.step(SCAN_ORIENTATION, Direction::Forward);
        if !grid.in_region(next) {
            return Ok(cell);
        }
        cell = next;
    }
}
