//! blobtrace-pipeline: Region boundary tracing and blob converters (sans-IO).
//!
//! Turns segmented rasters into geometry:
//!
//! - [`trace_boundary`] walks the outer boundary of a 4-connected region
//!   and returns a closed polygon of lattice corners.
//! - The [`convert`] functions wrap it (and a few maximum searches and
//!   statistics) into the converters the `blobtrace` CLI exposes.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! buffers and returns structured data. File handling lives in the
//! `blobtrace` binary and JSON serialization in `blobtrace-export`.

pub mod convert;
pub mod decode;
pub mod grid;
pub mod mask;
pub mod orientation;
pub mod seed;
pub mod segment;
pub mod stats;
pub mod trace;
pub mod types;

#[cfg(test)]
mod test_support;

pub use convert::{
    blob_to_blob_threshold, blob_to_dot_max, circle_to_dot_max, label_stats, mask_to_blob,
};
pub use grid::{LabelGrid, RegionGrid};
pub use orientation::{Axis, Direction, Orientation, Sign, Turn};
pub use stats::LabelStatistics;
pub use trace::{ClosureRule, TraceConfig, TraceError, trace_boundary};
pub use types::{
    BoundaryPolygon, Cell, Circle, CornerPoint, Dimensions, GrayImage, IntensityImage,
    PipelineConfig, PipelineError, Point, Polyline, ScoreImage,
};
