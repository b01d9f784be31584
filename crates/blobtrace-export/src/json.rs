//! JSON document serializers.
//!
//! Three document shapes are produced, matching what downstream
//! viewers already read:
//!
//! - contour: `{ "contour": [ { "x": 3, "y": 0, "z": 0 }, ... ] }`
//! - point: `{ "point": { "x": 4, "y": 7, "z": 0 } }`
//! - volumes: `{ "volumes": [ { "label": 1, ..., "volumeUnit": "mm^3" } ] }`
//!
//! Coordinates are lattice corners or pixel cells; `z` is always 0.
//! These are pure functions with no I/O -- they return a `String`.

use serde::Serialize;

use blobtrace_pipeline::{BoundaryPolygon, Cell, LabelStatistics};

/// Errors that can occur while serializing a document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct Point3 {
    x: i64,
    y: i64,
    z: i64,
}

impl Point3 {
    const fn planar(x: i64, y: i64) -> Self {
        Self { x, y, z: 0 }
    }
}

#[derive(Serialize)]
struct ContourDocument {
    contour: Vec<Point3>,
}

#[derive(Serialize)]
struct PointDocument {
    point: Point3,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeEntry<'a> {
    label: u32,
    min: u16,
    max: u16,
    median: f64,
    mean: f64,
    sigma: f64,
    variance: f64,
    sum: u64,
    count: u64,
    region_dimension: u32,
    region_index: [u32; 2],
    region_size: [u32; 2],
    volume_value: f64,
    volume_unit: &'a str,
}

#[derive(Serialize)]
struct VolumesDocument<'a> {
    volumes: Vec<VolumeEntry<'a>>,
}

/// Serialize a traced boundary as a contour document.
///
/// Points are written in trace order without repeating the first.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_contour_json(polygon: &BoundaryPolygon) -> Result<String, ExportError> {
    let document = ContourDocument {
        contour: polygon
            .points()
            .iter()
            .map(|c| Point3::planar(c.x, c.y))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Serialize a single cell as a point document.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_point_json(cell: Cell) -> Result<String, ExportError> {
    let document = PointDocument {
        point: Point3::planar(cell.x, cell.y),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Serialize label statistics as a volumes document, labelling each
/// volume with `unit`.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_volumes_json(stats: &[LabelStatistics], unit: &str) -> Result<String, ExportError> {
    let document = VolumesDocument {
        volumes: stats
            .iter()
            .map(|s| VolumeEntry {
                label: s.label,
                min: s.min,
                max: s.max,
                median: s.median,
                mean: s.mean,
                sigma: s.sigma,
                variance: s.variance,
                sum: s.sum,
                count: s.count,
                region_dimension: 2,
                region_index: s.region_index,
                region_size: s.region_size,
                volume_value: s.volume,
                volume_unit: unit,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
