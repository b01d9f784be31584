//! Per-component intensity statistics.
//!
//! A binary image is split into 4-connected components, then every
//! component (and the background, label 0) is summarised over the
//! matching pixels of a 16-bit intensity image.

use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, IntensityImage, PipelineError};

/// Summary of one labelled component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStatistics {
    /// Component label; 0 is the background.
    pub label: u32,
    /// Smallest intensity.
    pub min: u16,
    /// Largest intensity.
    pub max: u16,
    /// Median intensity (mean of the two middle values for even counts).
    pub median: f64,
    /// Mean intensity.
    pub mean: f64,
    /// Sample standard deviation.
    pub sigma: f64,
    /// Sample variance; zero for a single pixel.
    pub variance: f64,
    /// Sum of intensities.
    pub sum: u64,
    /// Number of pixels.
    pub count: u64,
    /// Top-left corner of the bounding box.
    pub region_index: [u32; 2],
    /// Width and height of the bounding box.
    pub region_size: [u32; 2],
    /// `count * pixel_size`.
    pub volume: f64,
}

#[derive(Default)]
struct Accumulator {
    values: Vec<u16>,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Accumulator {
    fn push(&mut self, x: u32, y: u32, value: u16) {
        if self.values.is_empty() {
            (self.min_x, self.min_y, self.max_x, self.max_y) = (x, y, x, y);
        } else {
            self.min_x = self.min_x.min(x);
            self.min_y = self.min_y.min(y);
            self.max_x = self.max_x.max(x);
            self.max_y = self.max_y.max(y);
        }
        self.values.push(value);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(mut self, label: u32, pixel_size: f64) -> LabelStatistics {
        self.values.sort_unstable();
        let values = &self.values;
        let n = values.len();
        let count = n as u64;
        let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
        let mean = sum as f64 / n as f64;
        let median = if n % 2 == 1 {
            f64::from(values[n / 2])
        } else {
            f64::midpoint(f64::from(values[n / 2 - 1]), f64::from(values[n / 2]))
        };
        let variance = if n > 1 {
            values
                .iter()
                .map(|&v| (f64::from(v) - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64
        } else {
            0.0
        };

        LabelStatistics {
            label,
            min: values[0],
            max: values[n - 1],
            median,
            mean,
            sigma: variance.sqrt(),
            variance,
            sum,
            count,
            region_index: [self.min_x, self.min_y],
            region_size: [self.max_x - self.min_x + 1, self.max_y - self.min_y + 1],
            volume: count as f64 * pixel_size,
        }
    }
}

/// Label the non-zero pixels of `binary` into 4-connected components
/// and summarise `intensity` over each, ordered by label.
///
/// # Errors
///
/// Returns [`PipelineError::DimensionMismatch`] if the two images
/// differ in size.
pub fn label_statistics(
    intensity: &IntensityImage,
    binary: &GrayImage,
    pixel_size: f64,
) -> Result<Vec<LabelStatistics>, PipelineError> {
    let expected = Dimensions {
        width: intensity.width(),
        height: intensity.height(),
    };
    let actual = Dimensions {
        width: binary.width(),
        height: binary.height(),
    };
    if expected != actual {
        return Err(PipelineError::DimensionMismatch { expected, actual });
    }

    let labels = connected_components(binary, Connectivity::Four, Luma([0u8]));
    let mut groups: BTreeMap<u32, Accumulator> = BTreeMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        groups
            .entry(label.0[0])
            .or_default()
            .push(x, y, intensity.get_pixel(x, y).0[0]);
    }
    tracing::debug!(labels = groups.len(), "labelled components");

    Ok(groups
        .into_iter()
        .map(|(label, acc)| acc.finish(label, pixel_size))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::grid_from_rows;

    #[test]
    fn two_components_and_background() {
        let binary = grid_from_rows(&["##..", "....", "..##"]);
        let intensity =
            IntensityImage::from_fn(4, 3, |x, y| Luma([u16::try_from(x + 4 * y).unwrap()]));
        let stats = label_statistics(&intensity, &binary, 0.5).unwrap();

        assert_eq!(stats.len(), 3);
        assert_eq!(
            stats.iter().map(|s| s.label).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let background = &stats[0];
        assert_eq!(background.count, 8);

        let top = &stats[1];
        assert_eq!((top.min, top.max, top.sum, top.count), (0, 1, 1, 2));
        assert!((top.mean - 0.5).abs() < 1e-12);
        assert!((top.median - 0.5).abs() < 1e-12);
        assert!((top.variance - 0.5).abs() < 1e-12);
        assert!((top.sigma - 0.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(top.region_index, [0, 0]);
        assert_eq!(top.region_size, [2, 1]);
        assert!((top.volume - 1.0).abs() < 1e-12);

        let bottom = &stats[2];
        assert_eq!((bottom.min, bottom.max), (10, 11));
        assert_eq!(bottom.region_index, [2, 2]);
    }

    #[test]
    fn diagonal_pixels_are_separate_components() {
        let binary = grid_from_rows(&["#.", ".#"]);
        let intensity = IntensityImage::from_pixel(2, 2, Luma([3]));
        let stats = label_statistics(&intensity, &binary, 1.0).unwrap();
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().skip(1).all(|s| s.count == 1 && s.variance == 0.0));
    }

    #[test]
    fn odd_count_median_is_middle_value() {
        let binary = grid_from_rows(&["###"]);
        let intensity = IntensityImage::from_raw(3, 1, vec![9, 1, 4]).unwrap();
        let stats = label_statistics(&intensity, &binary, 1.0).unwrap();
        assert_eq!(stats.len(), 1);
        assert!((stats[0].median - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sixteen_bit_intensities_are_kept() {
        let binary = grid_from_rows(&["##"]);
        let intensity = IntensityImage::from_raw(2, 1, vec![1000, 3000]).unwrap();
        let stats = label_statistics(&intensity, &binary, 1.0).unwrap();
        assert_eq!((stats[0].min, stats[0].max, stats[0].sum), (1000, 3000, 4000));
        assert!((stats[0].median - 2000.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let result = label_statistics(&IntensityImage::new(2, 2), &GrayImage::new(3, 2), 1.0);
        assert!(matches!(
            result,
            Err(PipelineError::DimensionMismatch { .. })
        ));
    }
}
