//! Lanczos-3 resampling
//!
//! Color channels are filtered premultiplied by alpha so fully transparent
//! pixels contribute nothing. The image is always stretched to the exact
//! target size; there is no letterboxing.

use crate::error::{Error, Result};
use crate::types::{RasterImage, dimension_in_range};
use image::Rgba32FImage;
use image::imageops::{self, FilterType};

fn premultiply(image: &RasterImage) -> Result<Rgba32FImage> {
    let data: Vec<f32> = image
        .colors()
        .flat_map(|[r, g, b, a]| {
            let alpha = a as f32 / 255.0;
            [
                r as f32 / 255.0 * alpha,
                g as f32 / 255.0 * alpha,
                b as f32 / 255.0 * alpha,
                alpha,
            ]
        })
        .collect();

    Rgba32FImage::from_raw(image.width(), image.height(), data).ok_or_else(|| {
        Error::Encoding(format!(
            "float buffer does not fit {}x{}",
            image.width(),
            image.height()
        ))
    })
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn unpremultiply(buffer: &Rgba32FImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(buffer.as_raw().len());
    for px in buffer.pixels() {
        let [r, g, b, alpha] = px.0;
        let a = to_u8(alpha);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        out.extend_from_slice(&[to_u8(r / alpha), to_u8(g / alpha), to_u8(b / alpha), a]);
    }
    out
}

/// Resize `image` to exactly `width` x `height`.
///
/// Both dimensions must be within 1..=256. Requesting the image's own size
/// returns a pixel-identical copy.
pub fn resample(image: &RasterImage, width: u32, height: u32) -> Result<RasterImage> {
    if !dimension_in_range(width) || !dimension_in_range(height) {
        return Err(Error::InvalidSize { width, height });
    }

    let (src_w, src_h) = image.dimensions();
    if (src_w, src_h) == (width, height) {
        return Ok(image.clone());
    }

    log::trace!("resampling {}x{} -> {}x{}", src_w, src_h, width, height);

    let premultiplied = premultiply(image)?;
    let resized = imageops::resize(&premultiplied, width, height, FilterType::Lanczos3);
    RasterImage::new(width, height, unpremultiply(&resized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    (x * 7 % 256) as u8,
                    (y * 13 % 256) as u8,
                    ((x ^ y) % 256) as u8,
                    255 - ((x + y) % 64) as u8,
                ]);
            }
        }
        RasterImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_identity_size() {
        let img = gradient(100, 100);
        let out = resample(&img, 100, 100).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_solid_color_survives() {
        let img = RasterImage::solid(7, 5, [200, 100, 50, 255]).unwrap();
        for (w, h) in [(1, 1), (3, 2), (64, 64), (256, 13)] {
            let out = resample(&img, w, h).unwrap();
            assert_eq!(out.dimensions(), (w, h));
            assert!(out.colors().all(|c| c == [200, 100, 50, 255]));
        }
    }

    #[test]
    fn test_transparent_pixels_do_not_bleed() {
        let mut pixels = Vec::new();
        for _y in 0..8 {
            for x in 0..8 {
                if x < 4 {
                    pixels.extend_from_slice(&[255, 0, 0, 0]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255, 255]);
                }
            }
        }
        let img = RasterImage::new(8, 8, pixels).unwrap();
        let out = resample(&img, 5, 5).unwrap();
        assert!(out.colors().all(|[r, _, _, _]| r == 0));
    }

    #[test]
    fn test_non_square_is_stretched() {
        // Left half red, right half blue
        let mut pixels = Vec::new();
        for _y in 0..10 {
            for x in 0..40 {
                if x < 20 {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255, 255]);
                }
            }
        }
        let img = RasterImage::new(40, 10, pixels).unwrap();
        let out = resample(&img, 16, 16).unwrap();

        assert_eq!(out.dimensions(), (16, 16));
        for y in 0..16 {
            for x in 0..5 {
                assert_eq!(out.pixel(x, y), [255, 0, 0, 255], "({x}, {y})");
                assert_eq!(out.pixel(15 - x, y), [0, 0, 255, 255], "({}, {y})", 15 - x);
            }
        }
        assert!(out.colors().all(|[_, _, _, a]| a == 255));
    }

    #[test]
    fn test_deterministic() {
        let img = gradient(37, 23);
        assert_eq!(
            resample(&img, 16, 48).unwrap(),
            resample(&img, 16, 48).unwrap()
        );
    }

    #[test]
    fn test_invalid_sizes() {
        let img = gradient(4, 4);
        assert_eq!(
            resample(&img, 0, 4),
            Err(Error::InvalidSize {
                width: 0,
                height: 4
            })
        );
        assert!(matches!(
            resample(&img, 16, 257),
            Err(Error::InvalidSize { .. })
        ));
    }
}
