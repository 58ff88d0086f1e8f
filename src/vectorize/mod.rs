//! Image vectorization module
//!
//! Converts a raster image into a [`VectorDocument`] of filled paths at the
//! image's own resolution.
//!
//! The conversion process:
//! 1. Quantize colors into a bounded palette (median cut)
//! 2. Build a binary mask per palette cluster
//! 3. Trace each mask's outer boundaries and holes
//! 4. Simplify the polygons and fit cubic curves
//! 5. Collect one path per visible cluster, dominant color first

mod mask;
mod quantize;
mod simplify;
mod trace;

use crate::types::{RasterImage, VectorDocument, VectorPath};

pub use mask::{ColorMask, create_cluster_mask, mask_population};
pub use quantize::{ColorLabelMap, DEFAULT_MAX_COLORS, TRANSPARENT_ALPHA_THRESHOLD, quantize};
pub use simplify::{
    CORNER_ANGLE_DEGREES, MIN_TOLERANCE, fit_curves, simplify, simplify_closed,
    tolerance_for_canvas,
};
pub use trace::{trace, trace_mask};

/// Options for image vectorization
#[derive(Debug, Clone)]
pub struct VectorizeOptions {
    /// Palette bound, clamped to 2..=256 (default: 32)
    pub max_colors: usize,
    /// Simplification tolerance in pixels; derived from the canvas size
    /// when `None`
    pub tolerance: Option<f64>,
}

impl Default for VectorizeOptions {
    fn default() -> Self {
        Self {
            max_colors: DEFAULT_MAX_COLORS,
            tolerance: None,
        }
    }
}

/// Trace `image` into a vector document with the same canvas size.
///
/// Fully transparent clusters are left out. Each remaining cluster becomes
/// one nonzero-filled path whose holes wind opposite to its outlines.
pub fn vectorize(image: &RasterImage, options: &VectorizeOptions) -> VectorDocument {
    let (width, height) = image.dimensions();
    let tolerance = options
        .tolerance
        .unwrap_or_else(|| tolerance_for_canvas(width.max(height)));

    let labels = quantize(image, options.max_colors);
    let contours = trace(&labels);

    let mut paths = Vec::with_capacity(contours.len());
    for (cluster, polygons) in contours {
        let color = labels.palette()[cluster as usize];
        if color[3] == 0 {
            continue;
        }

        let mut path = VectorPath::new(color);
        for polygon in &polygons {
            path.merge(simplify(polygon, tolerance));
        }

        if path.is_empty() {
            log::debug!("cluster {} vanished during simplification", cluster);
            continue;
        }
        paths.push(path);
    }

    log::debug!(
        "vectorized {}x{} image into {} paths (tolerance {:.2})",
        width,
        height,
        paths.len(),
        tolerance
    );

    VectorDocument {
        width,
        height,
        paths,
    }
}
