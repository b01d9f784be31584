//! Helpers for building small rasters in tests.

use image::{GrayImage, Luma};

/// Build a binary raster from ASCII rows: `#` is 255, anything else 0.
pub fn grid_from_rows(rows: &[&str]) -> GrayImage {
    let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
    let width = rows
        .iter()
        .map(|r| u32::try_from(r.len()).unwrap_or(u32::MAX))
        .max()
        .unwrap_or(0);
    GrayImage::from_fn(width, height, |x, y| {
        let filled = rows[y as usize].as_bytes().get(x as usize) == Some(&b'#');
        Luma([if filled { 255 } else { 0 }])
    })
}

/// Count the `#` cells in ASCII rows.
pub fn filled_count(rows: &[&str]) -> i64 {
    rows.iter()
        .map(|r| r.bytes().filter(|&b| b == b'#').count())
        .sum::<usize>()
        .try_into()
        .unwrap_or(i64::MAX)
}
