//! Shared types for the blobtrace pipeline.

use serde::{Deserialize, Serialize};

use crate::trace::{ClosureRule, TraceConfig, TraceError};

/// Re-export `GrayImage` so downstream crates can hand decoded rasters
/// to the converters without depending on `image` directly.
pub use image::GrayImage;

/// Single-channel floating point score raster (e.g. a model confidence map).
pub type ScoreImage = image::ImageBuffer<image::Luma<f32>, Vec<f32>>;

/// 16-bit intensity raster, wide enough for CT and MR slices.
pub type IntensityImage = image::ImageBuffer<image::Luma<u16>, Vec<u16>>;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An open sequence of vertices, closed implicitly when used as a
/// polygon outline (e.g. a user-drawn blob annotation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// A circle in image coordinates, used to restrict a maximum search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre of the circle.
    pub center: Point,
    /// Radius in pixels.
    pub radius: f64,
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total number of cells.
    #[must_use]
    pub fn cell_count(self) -> usize {
        usize::try_from(u64::from(self.width) * u64::from(self.height)).unwrap_or(usize::MAX)
    }
}

/// Integer grid cell coordinate.
///
/// Signed so that neighbours of edge cells can be represented; such
/// cells are simply never in-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Cell {
    /// Create a new cell coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts `(x, y)` pixel indices into a cell.
    #[must_use]
    pub fn from_pixel(x: u32, y: u32) -> Self {
        Self::new(i64::from(x), i64::from(y))
    }
}

/// Lattice vertex shared by up to four cells.
///
/// Corner `(x, y)` touches cells `(x-1, y-1)`, `(x, y-1)`, `(x-1, y)`
/// and `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerPoint {
    /// Horizontal lattice coordinate.
    pub x: i64,
    /// Vertical lattice coordinate.
    pub y: i64,
}

impl CornerPoint {
    /// Create a new corner point.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Closed boundary polygon made of lattice corners.
///
/// The first point is not repeated at the end. Consecutive points
/// (including last to first) are one lattice unit apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPolygon(Vec<CornerPoint>);

impl BoundaryPolygon {
    /// Wrap an already-closed corner sequence.
    #[must_use]
    pub const fn new(points: Vec<CornerPoint>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polygon has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[CornerPoint] {
        &self.0
    }

    /// Consumes the polygon and returns its points.
    #[must_use]
    pub fn into_points(self) -> Vec<CornerPoint> {
        self.0
    }

    /// Shoelace area with sign, in image coordinates (y down).
    ///
    /// Traced polygons keep the region on the left of the path, which
    /// gives a negative area whose magnitude is the enclosed cell count.
    #[must_use]
    pub fn signed_area(&self) -> i64 {
        let n = self.0.len();
        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.0[i];
                let b = self.0[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice / 2
    }

    /// The polygon with collinear lattice points removed, leaving only
    /// the points where the path turns.
    #[must_use]
    pub fn vertices(&self) -> Self {
        let n = self.0.len();
        if n < 3 {
            return self.clone();
        }
        let kept = (0..n)
            .filter(|&i| {
                let prev = self.0[(i + n - 1) % n];
                let here = self.0[i];
                let next = self.0[(i + 1) % n];
                (here.x - prev.x, here.y - prev.y) != (next.x - here.x, next.y - here.y)
            })
            .map(|i| self.0[i])
            .collect();
        Self(kept)
    }
}

/// Configuration for the converters.
///
/// # Invariants
///
/// `score_threshold` must be finite, `pixel_size` finite and positive
/// and `transition_limit`, when set, non-zero. [`validate`](Self::validate)
/// checks these; the converters call it before doing any work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// When the boundary tracer considers the outline closed.
    pub closure_rule: ClosureRule,

    /// Override for the tracer's transition safeguard. `None` uses
    /// `4 * cell_count + 1`.
    pub transition_limit: Option<usize>,

    /// Lowest score that belongs to a region in `mask-to-blob`.
    pub score_threshold: f32,

    /// Physical size of one pixel, multiplied into label volumes.
    pub pixel_size: f64,

    /// Unit label written next to label volumes.
    pub volume_unit: String,
}

impl PipelineConfig {
    /// Default closure rule.
    pub const DEFAULT_CLOSURE_RULE: ClosureRule = ClosureRule::State;
    /// Default `mask-to-blob` score threshold.
    pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.0;
    /// Default pixel size.
    pub const DEFAULT_PIXEL_SIZE: f64 = 1.0;
    /// Default volume unit.
    pub const DEFAULT_VOLUME_UNIT: &'static str = "mm^3";

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.score_threshold.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "score_threshold must be finite, got {}",
                self.score_threshold
            )));
        }
        if !(self.pixel_size.is_finite() && self.pixel_size > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "pixel_size must be finite and positive, got {}",
                self.pixel_size
            )));
        }
        if self.transition_limit == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "transition_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The tracer settings carried by this configuration.
    #[must_use]
    pub const fn trace_config(&self) -> TraceConfig {
        TraceConfig {
            closure_rule: self.closure_rule,
            transition_limit: self.transition_limit,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            closure_rule: Self::DEFAULT_CLOSURE_RULE,
            transition_limit: None,
            score_threshold: Self::DEFAULT_SCORE_THRESHOLD,
            pixel_size: Self::DEFAULT_PIXEL_SIZE,
            volume_unit: Self::DEFAULT_VOLUME_UNIT.to_string(),
        }
    }
}

/// Errors that can occur while converting an image.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// A raw buffer does not hold `width * height` samples.
    #[error("raw buffer holds {actual} samples, expected {expected}")]
    BufferSize {
        /// Samples required by the declared dimensions.
        expected: usize,
        /// Samples present.
        actual: usize,
    },

    /// A point list or circle description could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Two rasters that must be aligned have different sizes.
    #[error(
        "image dimensions differ: {}x{} vs {}x{}",
        expected.width,
        expected.height,
        actual.width,
        actual.height
    )]
    DimensionMismatch {
        /// Dimensions of the reference raster.
        expected: Dimensions,
        /// Dimensions of the offending raster.
        actual: Dimensions,
    },

    /// A mask polygon has too few vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    InvalidPolygon(usize),

    /// The maximum score is below the region threshold.
    #[error(
        "no region found, maximum value of {maximum} is below the threshold value of {threshold}"
    )]
    BelowThreshold {
        /// Largest score in the raster.
        maximum: f32,
        /// Configured threshold.
        threshold: f32,
    },

    /// Masking left no non-zero pixel.
    #[error("masked image is empty")]
    EmptyMask,

    /// Boundary tracing failed.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
