//! Compass orientation, rotation and single-cell movement.
//!
//! Coordinates follow the image convention: `x` grows to the right and
//! `y` grows downward. Turning left therefore cycles
//! `+X -> -Y -> -X -> +Y -> +X`, which is a visual left turn on screen.

use crate::types::{Cell, CornerPoint};

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// The other axis.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }
}

/// Direction along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Towards increasing coordinates.
    Positive,
    /// Towards decreasing coordinates.
    Negative,
}

impl Sign {
    /// The opposite sign.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// `+1` or `-1`.
    #[must_use]
    pub const fn unit(self) -> i64 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Counter-clockwise on screen.
    Left,
    /// Clockwise on screen.
    Right,
}

/// Movement direction relative to the current facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One cell ahead.
    Forward,
    /// One cell behind.
    Backward,
}

/// One of the four axis-aligned compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation {
    /// Axis the orientation points along.
    pub axis: Axis,
    /// Which way along the axis.
    pub sign: Sign,
}

impl Orientation {
    /// Facing right.
    pub const PLUS_X: Self = Self::new(Axis::X, Sign::Positive);
    /// Facing left.
    pub const MINUS_X: Self = Self::new(Axis::X, Sign::Negative);
    /// Facing down.
    pub const PLUS_Y: Self = Self::new(Axis::Y, Sign::Positive);
    /// Facing up.
    pub const MINUS_Y: Self = Self::new(Axis::Y, Sign::Negative);

    /// All four orientations in left-turn order starting at `+X`.
    pub const ALL: [Self; 4] = [Self::PLUS_X, Self::MINUS_Y, Self::MINUS_X, Self::PLUS_Y];

    /// Create an orientation from its parts.
    #[must_use]
    pub const fn new(axis: Axis, sign: Sign) -> Self {
        Self { axis, sign }
    }

    /// Rotate a quarter turn.
    ///
    /// Leaving the X axis flips the sign on a left turn, leaving the Y
    /// axis flips it on a right turn.
    #[must_use]
    pub const fn rotate(self, turn: Turn) -> Self {
        let flips = matches!(
            (turn, self.axis),
            (Turn::Left, Axis::X) | (Turn::Right, Axis::Y)
        );
        let sign = if flips { self.sign.flip() } else { self.sign };
        Self::new(self.axis.perpendicular(), sign)
    }

    /// Unit offset `(dx, dy)` of one step forward.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self.axis {
            Axis::X => (self.sign.unit(), 0),
            Axis::Y => (0, self.sign.unit()),
        }
    }

    /// Offset from a cell's origin corner to the far side facing this way:
    /// `1` on the axis when positive, otherwise nothing.
    const fn far_side(self) -> (i64, i64) {
        match (self.axis, self.sign) {
            (_, Sign::Negative) => (0, 0),
            (Axis::X, Sign::Positive) => (1, 0),
            (Axis::Y, Sign::Positive) => (0, 1),
        }
    }
}

impl Cell {
    /// Move one cell along `orientation`.
    ///
    /// The result may lie outside the grid; probing it is answered as
    /// "not in region" by the grid accessor.
    #[must_use]
    pub const fn step(self, orientation: Orientation, direction: Direction) -> Self {
        let (dx, dy) = orientation.delta();
        match direction {
            Direction::Forward => Self::new(self.x + dx, self.y + dy),
            Direction::Backward => Self::new(self.x - dx, self.y - dy),
        }
    }

    /// The corner diagonally forward-left of this cell when facing
    /// `orientation`.
    #[must_use]
    pub const fn forward_left_corner(self, orientation: Orientation) -> CornerPoint {
        let (fx, fy) = orientation.far_side();
        let (lx, ly) = orientation.rotate(Turn::Left).far_side();
        CornerPoint::new(self.x + fx + lx, self.y + fy + ly)
    }
}
