//! blobtrace-export: Pure JSON serializers (sans-IO)
//!
//! Converts traced boundaries, points and label statistics into the
//! JSON documents written by the `blobtrace` converters.

pub mod json;

pub use json::{ExportError, to_contour_json, to_point_json, to_volumes_json};
