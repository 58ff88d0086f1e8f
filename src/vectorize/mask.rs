//! Per-cluster binary masks
//!
//! The contour tracer works on one cluster at a time; these masks mark
//! which pixels belong to it.

use super::quantize::ColorLabelMap;

/// A binary mask, one byte per pixel (1 = member)
pub type ColorMask = Vec<u8>;

/// Mark every pixel whose label is `cluster`
pub fn create_cluster_mask(map: &ColorLabelMap, cluster: u16) -> ColorMask {
    map.labels()
        .iter()
        .map(|&label| u8::from(label == cluster))
        .collect()
}

/// Number of set pixels in a mask
pub fn mask_population(mask: &ColorMask) -> usize {
    mask.iter().filter(|&&v| v == 1).count()
}
