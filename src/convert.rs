//! Conversion entry points
//!
//! Input is always decoded first, so corrupt bytes report
//! [`Error::Decode`] regardless of the other arguments. Parameters are
//! validated before any pipeline work starts, and a failed call never
//! returns partial output.

use crate::decode::decode;
use crate::error::{Error, Result};
use crate::ico;
use crate::resample::resample;
use crate::svg;
use crate::types::{
    DEFAULT_ICON_SIZES, DEFAULT_SVG_SIZE, RasterImage, SizeSet, VectorDocument,
    dimension_in_range,
};
use crate::vectorize::{DEFAULT_MAX_COLORS, VectorizeOptions, vectorize};

/// Options for ICO conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcoOptions {
    /// Requested icon sizes; duplicates and order do not matter
    pub sizes: Vec<u32>,
}

impl Default for IcoOptions {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_ICON_SIZES.to_vec(),
        }
    }
}

/// Options for SVG conversion
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Canvas width and height (default: 256)
    pub size: u32,
    /// Palette bound for tracing (default: 32)
    pub max_colors: usize,
    /// Simplification tolerance; scales with `size` when `None`
    pub tolerance: Option<f64>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SVG_SIZE,
            max_colors: DEFAULT_MAX_COLORS,
            tolerance: None,
        }
    }
}

/// Convert image bytes into an ICO container.
///
/// `sizes` defaults to 16, 32, 48, 64, 128 and 256.
pub fn imgico(input: &[u8], sizes: Option<&[u32]>) -> Result<Vec<u8>> {
    let options = match sizes {
        Some(sizes) => IcoOptions {
            sizes: sizes.to_vec(),
        },
        None => IcoOptions::default(),
    };
    imgico_with_options(input, &options)
}

pub fn imgico_with_options(input: &[u8], options: &IcoOptions) -> Result<Vec<u8>> {
    let image = decode(input)?;
    ico_from_image(&image, options)
}

/// Build an ICO container from an already decoded image
pub fn ico_from_image(image: &RasterImage, options: &IcoOptions) -> Result<Vec<u8>> {
    let sizes = SizeSet::new(&options.sizes)?;
    ico::encode(image, &sizes)
}

/// Convert image bytes into SVG markup on a `size` x `size` canvas.
///
/// `size` defaults to 256.
pub fn imgsvg(input: &[u8], size: Option<u32>) -> Result<Vec<u8>> {
    let options = SvgOptions {
        size: size.unwrap_or(DEFAULT_SVG_SIZE),
        ..SvgOptions::default()
    };
    imgsvg_with_options(input, &options)
}

pub fn imgsvg_with_options(input: &[u8], options: &SvgOptions) -> Result<Vec<u8>> {
    let image = decode(input)?;
    svg_from_image(&image, options)
}

/// Trace an already decoded image into SVG markup
pub fn svg_from_image(image: &RasterImage, options: &SvgOptions) -> Result<Vec<u8>> {
    let document = vector_document(image, options)?;
    svg::emit(&document)
}

/// Resample `image` to the requested canvas and trace it
pub fn vector_document(image: &RasterImage, options: &SvgOptions) -> Result<VectorDocument> {
    if !dimension_in_range(options.size) {
        return Err(Error::InvalidSize {
            width: options.size,
            height: options.size,
        });
    }

    let canvas = resample(image, options.size, options.size)?;
    let vectorize_options = VectorizeOptions {
        max_colors: options.max_colors,
        tolerance: options.tolerance,
    };
    Ok(vectorize(&canvas, &vectorize_options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        assert_eq!(IcoOptions::default().sizes, vec![16, 32, 48, 64, 128, 256]);
        let svg = SvgOptions::default();
        assert_eq!(svg.size, 256);
        assert_eq!(svg.max_colors, 32);
    }

    #[test]
    fn test_decode_error_wins_over_bad_sizes() {
        assert!(matches!(imgico(&[], Some(&[])), Err(Error::Decode(_))));
        assert!(matches!(imgsvg(b"junk", Some(0)), Err(Error::Decode(_))));
    }

    #[test]
    fn test_svg_size_validation() {
        let img = RasterImage::solid(2, 2, [0, 0, 0, 255]).unwrap();
        for size in [0, 257, 1024] {
            let options = SvgOptions {
                size,
                ..SvgOptions::default()
            };
            assert_eq!(
                vector_document(&img, &options),
                Err(Error::InvalidSize {
                    width: size,
                    height: size
                })
            );
        }
    }
}
