//! Decoding converter inputs from bytes.
//!
//! Images go through the `image` crate and come out as grayscale.
//! Score rasters and annotation polygons are raw native-endian `f32`
//! buffers; circles are a short whitespace-separated text line.

use image::GrayImage;

use crate::types::{Circle, IntensityImage, PipelineError, Point, Polyline, ScoreImage};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Decode raw image bytes and convert to grayscale.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded grayscale image"]
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Decode raw image bytes into 16-bit luma.
///
/// 16-bit grayscale sources keep their full range; 8-bit sources are
/// scaled up by the `image` crate.
///
/// # Errors
///
/// Same as [`decode_grayscale`].
#[must_use = "returns the decoded intensity image"]
pub fn decode_intensity(bytes: &[u8]) -> Result<IntensityImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma16())
}

fn ne_floats(bytes: &[u8]) -> impl Iterator<Item = f32> + '_ {
    bytes.chunks_exact(F32_BYTES).map(|chunk| {
        let mut raw = [0u8; F32_BYTES];
        raw.copy_from_slice(chunk);
        f32::from_ne_bytes(raw)
    })
}

/// Interpret `bytes` as a `width * height` row-major `f32` raster.
///
/// Bytes past the last sample are ignored.
///
/// # Errors
///
/// Returns [`PipelineError::BufferSize`] if fewer than
/// `width * height` samples are present.
pub fn scores_from_ne_bytes(
    width: u32,
    height: u32,
    bytes: &[u8],
) -> Result<ScoreImage, PipelineError> {
    let expected = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX);
    let actual = bytes.len() / F32_BYTES;
    if actual < expected {
        return Err(PipelineError::BufferSize { expected, actual });
    }

    let samples: Vec<f32> = ne_floats(bytes).take(expected).collect();
    ScoreImage::from_raw(width, height, samples)
        .ok_or(PipelineError::BufferSize { expected, actual })
}

/// Interpret `bytes` as interleaved `x, y` `f32` pairs.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedInput`] if the length is not a
/// whole number of pairs.
pub fn polyline_from_ne_bytes(bytes: &[u8]) -> Result<Polyline, PipelineError> {
    if bytes.len() % (2 * F32_BYTES) != 0 {
        return Err(PipelineError::MalformedInput(format!(
            "point buffer of {} bytes is not a whole number of (x, y) f32 pairs",
            bytes.len()
        )));
    }

    let values: Vec<f32> = ne_floats(bytes).collect();
    Ok(Polyline::new(
        values
            .chunks_exact(2)
            .map(|pair| Point::new(f64::from(pair[0]), f64::from(pair[1])))
            .collect(),
    ))
}

/// Parse a circle written as `cx cy r`.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedInput`] unless the text holds
/// exactly three numbers.
pub fn circle_from_text(text: &str) -> Result<Circle, PipelineError> {
    let values = text
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|err| {
                PipelineError::MalformedInput(format!("invalid circle value {token:?}: {err}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let [cx, cy, radius] = values[..] else {
        return Err(PipelineError::MalformedInput(format!(
            "circle needs `cx cy r`, got {} values",
            values.len()
        )));
    };
    Ok(Circle {
        center: Point::new(cx, cy),
        radius,
    })
}
