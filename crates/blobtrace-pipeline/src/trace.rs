//! Boundary tracing: walk the outer boundary of a region cell by cell.
//!
//! The tracer is a wall follower over boundary faces. A [`TracerState`]
//! is a region cell plus a facing whose front cell is never in the
//! region, so each state names one unit edge of the boundary. One
//! [`TracerState::advance`] moves to the next edge with the region kept
//! on the left of the path:
//!
//! 1. Turn left and probe ahead. If that cell is outside the region,
//!    stay put facing left (convex corner).
//! 2. Otherwise move there, turn back to the entry facing and probe
//!    ahead again. Move and turn right if it is inside (concave corner),
//!    otherwise keep facing ahead (straight wall).
//!
//! Each transition emits the corner forward-left of the new state, so
//! consecutive corners are one lattice unit apart.

use serde::{Deserialize, Serialize};

use crate::grid::RegionGrid;
use crate::orientation::{Direction, Orientation, Turn};
use crate::seed::{SCAN_ORIENTATION, locate_boundary_seed};
use crate::types::{BoundaryPolygon, Cell, CornerPoint, Dimensions};

/// When a trace counts as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClosureRule {
    /// Stop when the state that emitted the first corner recurs.
    ///
    /// Every boundary edge has exactly one successor, so this always
    /// closes after one full lap, even when the path passes the same
    /// corner twice at a diagonal pinch.
    #[default]
    State,

    /// Stop as soon as the first corner point recurs.
    ///
    /// Matches the legacy converter. On regions with a diagonal pinch
    /// this can stop after a partial loop around the pinch.
    Position,
}

/// Tracer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceConfig {
    /// Closure test.
    pub closure_rule: ClosureRule,
    /// Maximum number of transitions before giving up. `None` uses
    /// [`default_transition_limit`].
    pub transition_limit: Option<usize>,
}

/// Errors reported by the tracer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    /// The seed cell is not in the region.
    #[error("seed cell ({}, {}) is not in the region", cell.x, cell.y)]
    InvalidSeed {
        /// The rejected seed.
        cell: Cell,
    },

    /// The walk did not return to its start within the safeguard.
    #[error("boundary trace did not close after {transitions} transitions")]
    TraceDidNotClose {
        /// Transitions performed before giving up.
        transitions: usize,
    },
}

/// How a transition moved along the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Rotated left without moving (convex corner).
    TurnLeftInPlace,
    /// Moved sideways along a straight wall.
    Straight,
    /// Moved sideways, then forward, then turned right (concave corner).
    ForwardThenRight,
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State after the transition.
    pub state: TracerState,
    /// Corner emitted for the new state.
    pub corner: CornerPoint,
    /// Which rule fired.
    pub kind: TransitionKind,
}

/// Position and facing of the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TracerState {
    /// Current region cell.
    pub cell: Cell,
    /// Current facing; the cell ahead is outside the region.
    pub orientation: Orientation,
}

impl TracerState {
    /// Create a state.
    #[must_use]
    pub const fn new(cell: Cell, orientation: Orientation) -> Self {
        Self { cell, orientation }
    }

    /// The corner this state stands for.
    #[must_use]
    pub const fn corner(self) -> CornerPoint {
        self.cell.forward_left_corner(self.orientation)
    }

    /// Apply one wall-following transition.
    #[must_use]
    pub fn advance<G: RegionGrid + ?Sized>(self, grid: &G) -> Transition {
        let left = self.orientation.rotate(Turn::Left);
        let side = self.cell.step(left, Direction::Forward);
        if !grid.in_region(side) {
            return Self::new(self.cell, left).emit(TransitionKind::TurnLeftInPlace);
        }

        let entry = left.rotate(Turn::Right);
        let ahead = side.step(entry, Direction::Forward);
        if grid.in_region(ahead) {
            Self::new(ahead, entry.rotate(Turn::Right)).emit(TransitionKind::ForwardThenRight)
        } else {
            Self::new(side, entry).emit(TransitionKind::Straight)
        }
    }

    const fn emit(self, kind: TransitionKind) -> Transition {
        Transition {
            state: self,
            corner: self.corner(),
            kind,
        }
    }
}

/// Safeguard used when no explicit limit is configured:
/// `4 * cell_count + 1` transitions.
///
/// A region has at most four boundary edges per cell and one extra
/// transition is needed to observe closure.
#[must_use]
pub fn default_transition_limit(dimensions: Dimensions) -> usize {
    dimensions.cell_count().saturating_mul(4).saturating_add(1)
}

/// Trace the boundary of the region containing `seed`.
///
/// The seed is first moved to the end of its scanline run with
/// [`locate_boundary_seed`]; the walk starts there facing
/// [`SCAN_ORIENTATION`]. The returned polygon keeps the region on its
/// left and has a negative [`signed_area`](BoundaryPolygon::signed_area).
///
/// If the run ends at a hole, the walk follows the hole's edge instead
/// and the area comes out positive. Seeding with the component's first
/// cell in row-major order always yields the outer boundary.
///
/// # Errors
///
/// Returns [`TraceError::InvalidSeed`] if `seed` is not in the region.
/// Returns [`TraceError::TraceDidNotClose`] if the walk exceeds the
/// transition limit.
pub fn trace_boundary<G: RegionGrid + ?Sized>(
    grid: &G,
    seed: Cell,
    config: &TraceConfig,
) -> Result<BoundaryPolygon, TraceError> {
    let start = TracerState::new(locate_boundary_seed(grid, seed)?, SCAN_ORIENTATION);
    let limit = config
        .transition_limit
        .unwrap_or_else(|| default_transition_limit(grid.dimensions()));
    tracing::debug!(?seed, boundary = ?start.cell, limit, "tracing boundary");

    let first = start.advance(grid);
    let mut points = vec![first.corner];
    let mut state = first.state;

    for _ in 1..limit {
        let next = state.advance(grid);
        let closed = match config.closure_rule {
            ClosureRule::State => next.state == first.state,
            ClosureRule::Position => next.corner == first.corner,
        };
        if closed {
            tracing::debug!(points = points.len(), "boundary closed");
            return Ok(BoundaryPolygon::new(points));
        }
        points.push(next.corner);
        state = next.state;
    }

    tracing::warn!(transitions = limit, "boundary trace did not close");
    Err(TraceError::TraceDidNotClose { transitions: limit })
}
