//! The converters: each takes decoded inputs and a [`PipelineConfig`]
//! and produces a boundary, a point or label statistics.

use image::GrayImage;

use crate::grid::LabelGrid;
use crate::mask::{mask_with_circle, mask_with_polygon};
use crate::segment::{argmax, component_at, connected_threshold, otsu_region};
use crate::stats::{LabelStatistics, label_statistics};
use crate::trace::{TraceError, trace_boundary};
use crate::types::{
    BoundaryPolygon, Cell, Circle, IntensityImage, PipelineConfig, PipelineError, Point, Polyline,
    ScoreImage,
};

/// Trace the blob around the highest score.
///
/// The region is every cell 4-connected to the maximum whose score lies
/// in `[score_threshold, maximum]`.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if the raster holds no
/// comparable score, [`PipelineError::BelowThreshold`] if the maximum
/// is below `score_threshold`, or any configuration or trace error.
pub fn mask_to_blob(
    scores: &ScoreImage,
    config: &PipelineConfig,
) -> Result<BoundaryPolygon, PipelineError> {
    config.validate()?;
    let max = argmax(scores).ok_or(PipelineError::EmptyInput)?;
    if max.value < config.score_threshold {
        return Err(PipelineError::BelowThreshold {
            maximum: max.value,
            threshold: config.score_threshold,
        });
    }
    tracing::info!(seed = ?max.cell, maximum = max.value, "growing region from maximum score");

    let region = connected_threshold(scores, max.cell, config.score_threshold, max.value);
    trace_outer_boundary(&region, max.cell, config)
}

/// Trace the Otsu-thresholded blob inside an annotation polygon.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidPolygon`] for a degenerate polygon,
/// [`PipelineError::EmptyMask`] if nothing non-zero lies inside it, or
/// any configuration or trace error.
pub fn blob_to_blob_threshold(
    image: &GrayImage,
    polygon: &Polyline,
    config: &PipelineConfig,
) -> Result<BoundaryPolygon, PipelineError> {
    config.validate()?;
    let masked = mask_with_polygon(image, polygon)?;
    let seed = brightest(&masked)?;

    let (level, region) = otsu_region(&masked);
    tracing::info!(?seed, level, "thresholded masked blob");

    trace_outer_boundary(&region, seed, config)
}

/// Brightest pixel inside an annotation polygon.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidPolygon`] for a degenerate polygon or
/// [`PipelineError::EmptyMask`] if nothing non-zero lies inside it.
pub fn blob_to_dot_max(image: &GrayImage, polygon: &Polyline) -> Result<Cell, PipelineError> {
    let masked = mask_with_polygon(image, polygon)?;
    brightest(&masked)
}

/// Brightest pixel inside a circle given in physical units.
///
/// Centre and radius are divided by `pixel_size` before rasterising.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyMask`] if nothing non-zero lies inside
/// the circle, or a configuration error.
pub fn circle_to_dot_max(
    image: &GrayImage,
    circle: &Circle,
    config: &PipelineConfig,
) -> Result<Cell, PipelineError> {
    config.validate()?;
    let scale = config.pixel_size;
    let in_pixels = Circle {
        center: Point::new(circle.center.x / scale, circle.center.y / scale),
        radius: circle.radius / scale,
    };
    let masked = mask_with_circle(image, &in_pixels)?;
    brightest(&masked)
}

/// Statistics of every 4-connected component of `binary`, with volumes
/// in units of `pixel_size`.
///
/// # Errors
///
/// Returns [`PipelineError::DimensionMismatch`] if the images differ in
/// size, or a configuration error.
pub fn label_stats(
    intensity: &IntensityImage,
    binary: &GrayImage,
    config: &PipelineConfig,
) -> Result<Vec<LabelStatistics>, PipelineError> {
    config.validate()?;
    label_statistics(intensity, binary, config.pixel_size)
}

/// Trace the outside of the component of `region` containing `inside`.
///
/// The walk starts from the component's first cell in row-major order
/// rather than from `inside`, so holes to the right of `inside` are
/// never mistaken for the outline.
fn trace_outer_boundary(
    region: &GrayImage,
    inside: Cell,
    config: &PipelineConfig,
) -> Result<BoundaryPolygon, PipelineError> {
    let component =
        component_at(region, inside).ok_or(TraceError::InvalidSeed { cell: inside })?;
    tracing::debug!(start = ?component.first, label = component.label, "outer boundary start");

    let grid = LabelGrid::new(&component.labels, component.label);
    Ok(trace_boundary(&grid, component.first, &config.trace_config())?)
}

fn brightest(masked: &GrayImage) -> Result<Cell, PipelineError> {
    match argmax(masked) {
        Some(max) if max.value > 0 => Ok(max.cell),
        _ => Err(PipelineError::EmptyMask),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::trace::ClosureRule;
    use crate::types::CornerPoint;

    fn polyline(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn corners(points: &[(i64, i64)]) -> Vec<CornerPoint> {
        points.iter().map(|&(x, y)| CornerPoint::new(x, y)).collect()
    }

    fn square_block_scores() -> ScoreImage {
        ScoreImage::from_fn(5, 4, |x, y| {
            Luma([match (x, y) {
                (2, 2) => 0.9,
                (1 | 2, 1 | 2) => 0.5,
                _ => -1.0,
            }])
        })
    }

    /// 3x3 ring of positive scores around a hole at (2, 2), with the
    /// maximum just left of the hole.
    fn ring_scores() -> ScoreImage {
        ScoreImage::from_fn(5, 5, |x, y| {
            Luma([match (x, y) {
                (2, 2) => -1.0,
                (1, 2) => 0.9,
                (1..=3, 1..=3) => 0.5,
                _ => -1.0,
            }])
        })
    }

    #[test]
    fn mask_to_blob_traces_region_around_maximum() {
        let polygon = mask_to_blob(&square_block_scores(), &PipelineConfig::default()).unwrap();
        assert_eq!(polygon.signed_area(), -4);
        assert_eq!(polygon.len(), 8);
        let vertices = polygon.vertices();
        assert_eq!(vertices.len(), 4);
        for corner in corners(&[(1, 1), (3, 1), (1, 3), (3, 3)]) {
            assert!(vertices.points().contains(&corner));
        }
    }

    #[test]
    fn mask_to_blob_traces_outside_of_ring() {
        let polygon = mask_to_blob(&ring_scores(), &PipelineConfig::default()).unwrap();
        // The outer outline encloses the hole too.
        assert_eq!(polygon.signed_area(), -9);
        assert_eq!(polygon.len(), 12);
        let vertices = polygon.vertices();
        assert_eq!(vertices.len(), 4);
        for corner in corners(&[(1, 1), (4, 1), (1, 4), (4, 4)]) {
            assert!(vertices.points().contains(&corner));
        }
    }

    #[test]
    fn mask_to_blob_threshold_narrows_region() {
        let config = PipelineConfig {
            score_threshold: 0.6,
            ..PipelineConfig::default()
        };
        let polygon = mask_to_blob(&square_block_scores(), &config).unwrap();
        assert_eq!(polygon.signed_area(), -1);
    }

    #[test]
    fn mask_to_blob_below_threshold_fails() {
        let scores = ScoreImage::from_pixel(3, 3, Luma([-0.5]));
        let result = mask_to_blob(&scores, &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::BelowThreshold { maximum, .. })
                if (maximum + 0.5).abs() < f32::EPSILON
        ));
    }

    #[test]
    fn mask_to_blob_empty_raster_fails() {
        let result = mask_to_blob(&ScoreImage::new(0, 0), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn mask_to_blob_rejects_invalid_config() {
        let config = PipelineConfig {
            score_threshold: f32::INFINITY,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            mask_to_blob(&square_block_scores(), &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn mask_to_blob_reports_unclosed_trace() {
        let config = PipelineConfig {
            transition_limit: Some(2),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            mask_to_blob(&square_block_scores(), &config),
            Err(PipelineError::Trace(TraceError::TraceDidNotClose { transitions: 2 }))
        ));
    }

    #[test]
    fn closure_rules_agree_on_simple_blob() {
        let position = PipelineConfig {
            closure_rule: ClosureRule::Position,
            ..PipelineConfig::default()
        };
        assert_eq!(
            mask_to_blob(&square_block_scores(), &position).unwrap(),
            mask_to_blob(&square_block_scores(), &PipelineConfig::default()).unwrap()
        );
    }

    /// Dim background, a bright 2x2 block at (2..4, 2..4) and an even
    /// brighter pixel at (5, 5) outside the annotation.
    fn annotated_image() -> (GrayImage, Polyline) {
        let image = GrayImage::from_fn(6, 6, |x, y| {
            Luma([match (x, y) {
                (5, 5) => 250,
                (2 | 3, 2 | 3) => 200,
                _ => 10,
            }])
        });
        let polygon = polyline(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)]);
        (image, polygon)
    }

    #[test]
    fn blob_threshold_traces_bright_block_inside_polygon() {
        let (image, polygon) = annotated_image();
        let boundary =
            blob_to_blob_threshold(&image, &polygon, &PipelineConfig::default()).unwrap();
        assert_eq!(boundary.signed_area(), -4);
        assert!(
            boundary
                .points()
                .iter()
                .all(|c| (2..=4).contains(&c.x) && (2..=4).contains(&c.y))
        );
    }

    #[test]
    fn blob_threshold_traces_outside_of_ring() {
        // Bright ring around a dim hole at (3, 3); the brightest pixel
        // sits just left of the hole.
        let image = GrayImage::from_fn(7, 7, |x, y| {
            Luma([match (x, y) {
                (3, 3) => 10,
                (2, 3) => 250,
                (2..=4, 2..=4) => 200,
                _ => 10,
            }])
        });
        let polygon = polyline(&[(0.0, 0.0), (7.0, 0.0), (7.0, 7.0), (0.0, 7.0)]);
        let boundary =
            blob_to_blob_threshold(&image, &polygon, &PipelineConfig::default()).unwrap();
        assert_eq!(boundary.signed_area(), -9);
        assert_eq!(boundary.vertices().len(), 4);
    }

    #[test]
    fn blob_threshold_on_black_mask_fails() {
        let image = GrayImage::new(4, 4);
        let polygon = polyline(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]);
        assert!(matches!(
            blob_to_blob_threshold(&image, &polygon, &PipelineConfig::default()),
            Err(PipelineError::EmptyMask)
        ));
    }

    #[test]
    fn dot_max_ignores_pixels_outside_polygon() {
        let (image, polygon) = annotated_image();
        assert_eq!(blob_to_dot_max(&image, &polygon).unwrap(), Cell::new(2, 2));
    }

    #[test]
    fn dot_max_rejects_degenerate_polygon() {
        let (image, _) = annotated_image();
        let line = polyline(&[(0.0, 0.0), (3.0, 3.0)]);
        assert!(matches!(
            blob_to_dot_max(&image, &line),
            Err(PipelineError::InvalidPolygon(2))
        ));
    }

    #[test]
    fn circle_dot_max_scales_by_pixel_size() {
        let image = GrayImage::from_fn(12, 12, |x, y| {
            Luma([match (x, y) {
                (9, 9) => 250,
                (6, 5) => 120,
                _ => 3,
            }])
        });
        let circle = Circle {
            center: Point::new(10.0, 10.0),
            radius: 4.0,
        };
        let config = PipelineConfig {
            pixel_size: 2.0,
            ..PipelineConfig::default()
        };
        assert_eq!(
            circle_to_dot_max(&image, &circle, &config).unwrap(),
            Cell::new(6, 5)
        );
    }

    #[test]
    fn circle_dot_max_outside_image_fails() {
        let image = GrayImage::from_pixel(4, 4, Luma([9]));
        let circle = Circle {
            center: Point::new(100.0, 100.0),
            radius: 1.0,
        };
        assert!(matches!(
            circle_to_dot_max(&image, &circle, &PipelineConfig::default()),
            Err(PipelineError::EmptyMask)
        ));
    }

    #[test]
    fn label_stats_uses_pixel_size() {
        let binary = GrayImage::from_fn(3, 1, |x, _| Luma([if x == 1 { 255 } else { 0 }]));
        let intensity = IntensityImage::from_pixel(3, 1, Luma([4]));
        let config = PipelineConfig {
            pixel_size: 0.25,
            ..PipelineConfig::default()
        };
        let stats = label_stats(&intensity, &binary, &config).unwrap();
        assert_eq!(stats.len(), 2);
        assert!((stats[0].volume - 0.5).abs() < 1e-12);
        assert!((stats[1].volume - 0.25).abs() < 1e-12);
    }
}
