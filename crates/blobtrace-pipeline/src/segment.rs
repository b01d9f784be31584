//! Region extraction ahead of boundary tracing.
//!
//! Locates the brightest pixel and grows or thresholds the region
//! around it. The output is always a binary [`GrayImage`] where
//! [`REGION`] marks region pixels, ready to be wrapped in a
//! [`LabelGrid`](crate::grid::LabelGrid).

use std::collections::VecDeque;

use image::{GrayImage, ImageBuffer, Luma, Primitive};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::orientation::{Direction, Orientation};
use crate::types::{Cell, ScoreImage};

/// Label of region pixels in binary masks.
pub const REGION: u8 = 255;

/// The largest pixel of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maximum<P> {
    /// Where the maximum was found.
    pub cell: Cell,
    /// Its value.
    pub value: P,
}

/// Find the largest pixel value.
///
/// Ties resolve to the first pixel in row-major order. NaN values are
/// skipped. Returns `None` for an empty raster or one holding only NaN.
#[must_use]
pub fn argmax<P: Primitive>(image: &ImageBuffer<Luma<P>, Vec<P>>) -> Option<Maximum<P>> {
    let mut best: Option<Maximum<P>> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        let value = pixel.0[0];
        if value.partial_cmp(&value).is_none() {
            continue;
        }
        if best.is_none_or(|b| value > b.value) {
            best = Some(Maximum {
                cell: Cell::from_pixel(x, y),
                value,
            });
        }
    }
    best
}

/// Grow the 4-connected region of scores within `[lower, upper]`
/// starting at `seed`.
///
/// Returns an empty mask if the seed is off the raster or its score
/// is out of range.
#[must_use]
pub fn connected_threshold(scores: &ScoreImage, seed: Cell, lower: f32, upper: f32) -> GrayImage {
    let mut region = GrayImage::new(scores.width(), scores.height());
    let accepts = |cell: Cell| -> Option<(u32, u32)> {
        let x = u32::try_from(cell.x).ok()?;
        let y = u32::try_from(cell.y).ok()?;
        let score = scores.get_pixel_checked(x, y)?.0[0];
        (lower..=upper).contains(&score).then_some((x, y))
    };

    let Some((x, y)) = accepts(seed) else {
        return region;
    };
    region.put_pixel(x, y, Luma([REGION]));
    let mut queue = VecDeque::from([seed]);

    while let Some(cell) = queue.pop_front() {
        for orientation in Orientation::ALL {
            let next = cell.step(orientation, Direction::Forward);
            if let Some((x, y)) = accepts(next)
                && region.get_pixel(x, y).0[0] != REGION
            {
                region.put_pixel(x, y, Luma([REGION]));
                queue.push_back(next);
            }
        }
    }

    region
}

/// Binarize with Otsu's method.
///
/// Returns the level and a mask of pixels strictly above it. The level
/// is capped below the image maximum so the brightest pixel always
/// belongs to the region.
#[must_use]
pub fn otsu_region(image: &GrayImage) -> (u8, GrayImage) {
    let brightest = image.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    let level = otsu_level(image).min(brightest.saturating_sub(1));
    (level, threshold(image, level, ThresholdType::Binary))
}

/// One 4-connected component of a binary mask.
#[derive(Debug, Clone)]
pub struct Component {
    /// Component labels for the whole mask; 0 is background.
    pub labels: ImageBuffer<Luma<u32>, Vec<u32>>,
    /// Label of this component.
    pub label: u32,
    /// First cell of the component in row-major order.
    ///
    /// Nothing of the component lies above it, so the end of its
    /// scanline run borders the outside and never a hole.
    pub first: Cell,
}

/// Label `mask` and return the component containing `cell`.
///
/// Returns `None` if `cell` is off the mask or on background.
#[must_use]
pub fn component_at(mask: &GrayImage, cell: Cell) -> Option<Component> {
    let x = u32::try_from(cell.x).ok()?;
    let y = u32::try_from(cell.y).ok()?;
    let labels = connected_components(mask, Connectivity::Four, Luma([0u8]));
    let label = labels.get_pixel_checked(x, y)?.0[0];
    if label == 0 {
        return None;
    }
    let first = labels
        .enumerate_pixels()
        .find(|(_, _, p)| p.0[0] == label)
        .map(|(x, y, _)| Cell::from_pixel(x, y))?;
    Some(Component {
        labels,
        label,
        first,
    })
}
