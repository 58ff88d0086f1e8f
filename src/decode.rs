//! Input decoding
//!
//! Every supported source format is a [`RasterDecoder`]. The decoder is
//! chosen by sniffing the leading signature bytes, never by file extension,
//! and the result is always normalized to an RGBA8 [`RasterImage`].

use crate::error::{Error, Result};
use crate::types::RasterImage;
use image::ImageFormat;

/// A source format the engine knows how to turn into a [`RasterImage`]
pub trait RasterDecoder: Send + Sync {
    /// Short format name used in logs
    fn name(&self) -> &'static str;

    /// Whether `bytes` start with this format's signature
    fn signature_matches(&self, bytes: &[u8]) -> bool;

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage>;
}

pub struct PngDecoder;
pub struct JpegDecoder;
pub struct GifDecoder;
pub struct BmpDecoder;
pub struct WebpDecoder;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

impl RasterDecoder for PngDecoder {
    fn name(&self) -> &'static str {
        "png"
    }

    fn signature_matches(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(PNG_SIGNATURE)
    }

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        decode_with_format(bytes, ImageFormat::Png)
    }
}

impl RasterDecoder for JpegDecoder {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    fn signature_matches(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(JPEG_SIGNATURE)
    }

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        decode_with_format(bytes, ImageFormat::Jpeg)
    }
}

impl RasterDecoder for GifDecoder {
    fn name(&self) -> &'static str {
        "gif"
    }

    fn signature_matches(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
    }

    // Only the first frame is used
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        decode_with_format(bytes, ImageFormat::Gif)
    }
}

impl RasterDecoder for BmpDecoder {
    fn name(&self) -> &'static str {
        "bmp"
    }

    fn signature_matches(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(b"BM")
    }

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        decode_with_format(bytes, ImageFormat::Bmp)
    }
}

impl RasterDecoder for WebpDecoder {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn signature_matches(&self, bytes: &[u8]) -> bool {
        bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
    }

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        decode_with_format(bytes, ImageFormat::WebP)
    }
}

static DECODERS: &[&dyn RasterDecoder] = &[
    &PngDecoder,
    &JpegDecoder,
    &GifDecoder,
    &BmpDecoder,
    &WebpDecoder,
];

/// Find the decoder whose signature matches `bytes`
pub fn decoder_for(bytes: &[u8]) -> Option<&'static dyn RasterDecoder> {
    DECODERS
        .iter()
        .copied()
        .find(|decoder| decoder.signature_matches(bytes))
}

/// Decode an image buffer of any supported format
pub fn decode(bytes: &[u8]) -> Result<RasterImage> {
    if bytes.is_empty() {
        return Err(Error::Decode("input is empty".to_string()));
    }

    let decoder = decoder_for(bytes)
        .ok_or_else(|| Error::Decode("unrecognized image signature".to_string()))?;

    let image = decoder.decode(bytes)?;
    log::debug!(
        "decoded {} input: {}x{} ({} bytes)",
        decoder.name(),
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(image)
}

fn decode_with_format(bytes: &[u8], format: ImageFormat) -> Result<RasterImage> {
    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
        // Anything the codec rejects is a problem with the input itself
        image::ImageError::Encoding(_) | image::ImageError::Parameter(_) => {
            Error::Decode(e.to_string())
        }
        other => Error::from(other),
    })?;
    RasterImage::try_from(img.to_rgba8()).map_err(|e| match e {
        Error::Encoding(msg) => Error::Decode(msg),
        other => other,
    })
}
