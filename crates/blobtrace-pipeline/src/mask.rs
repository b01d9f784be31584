//! Restricting an image to a user-drawn shape.
//!
//! Pixels whose centre falls outside the shape are set to zero, so a
//! following maximum search or threshold only sees the annotated area.
//! A pixel `(x, y)` has its centre at `(x + 0.5, y + 0.5)`.

use geo::coordinate_position::CoordPos;
use geo::{BoundingRect, CoordinatePosition, LineString, coord};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_ellipse_mut;

use crate::types::{Circle, PipelineError, Polyline};

/// Zero every pixel whose centre lies outside `polygon`.
///
/// The polygon is closed implicitly; pixel centres on its edge are
/// kept.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidPolygon`] if `polygon` has fewer
/// than three vertices.
pub fn mask_with_polygon(
    image: &GrayImage,
    polygon: &Polyline,
) -> Result<GrayImage, PipelineError> {
    if polygon.len() < 3 {
        return Err(PipelineError::InvalidPolygon(polygon.len()));
    }

    let outline: LineString<f64> = polygon.points().iter().map(|p| (p.x, p.y)).collect();
    let shape = geo::Polygon::new(outline, vec![]);
    let Some(bounds) = shape.bounding_rect() else {
        return Ok(GrayImage::new(image.width(), image.height()));
    };

    Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let centre = coord! { x: f64::from(x) + 0.5, y: f64::from(y) + 0.5 };
        if bounds.coordinate_position(&centre) != CoordPos::Outside
            && shape.coordinate_position(&centre) != CoordPos::Outside
        {
            *image.get_pixel(x, y)
        } else {
            Luma([0])
        }
    }))
}

/// Zero every pixel outside the filled `circle`.
///
/// The circle is rasterised with its centre and radius rounded to whole
/// pixels.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the centre or radius is
/// not finite or the radius is negative.
pub fn mask_with_circle(image: &GrayImage, circle: &Circle) -> Result<GrayImage, PipelineError> {
    let Circle { center, radius } = *circle;
    if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite() && radius >= 0.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "circle must have a finite centre and non-negative radius, got ({}, {}) r={radius}",
            center.x, center.y
        )));
    }

    let mut stencil = GrayImage::new(image.width(), image.height());
    let r = round_to_i32(radius);
    draw_filled_ellipse_mut(
        &mut stencil,
        (round_to_i32(center.x), round_to_i32(center.y)),
        r,
        r,
        Luma([255]),
    );
    Ok(apply_stencil(image, &stencil))
}

/// Keep `image` where `stencil` is non-zero.
fn apply_stencil(image: &GrayImage, stencil: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if stencil.get_pixel(x, y).0[0] == 0 {
            Luma([0])
        } else {
            *image.get_pixel(x, y)
        }
    })
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i32(value: f64) -> i32 {
    value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
