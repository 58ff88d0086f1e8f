//! ICO container encoding
//!
//! Layout (all fields little-endian):
//!
//! ```text
//! ICONDIR        reserved u16 = 0, type u16 = 1, count u16
//! ICONDIRENTRY   width u8, height u8 (0 means 256), color count u8 = 0,
//!                reserved u8 = 0, planes u16 = 1, bits per pixel u16 = 32,
//!                payload size u32, payload offset u32
//! payloads       one PNG stream per entry, in directory order
//! ```

use crate::error::{Error, Result};
use crate::resample::resample;
use crate::types::{RasterImage, SizeSet};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use rayon::prelude::*;
use std::io::{self, Cursor, Write};

/// Size of the ICONDIR header
pub const HEADER_LEN: usize = 6;
/// Size of one ICONDIRENTRY record
pub const DIR_ENTRY_LEN: usize = 16;

const RESOURCE_TYPE_ICON: u16 = 1;
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

/// One directory record of an icon container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconEntry {
    pub width: u32,
    pub height: u32,
    /// Palette size; 0 means "use bit depth"
    pub color_count: u8,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub payload_size: u32,
    /// Measured from the start of the container
    pub payload_offset: u32,
}

/// ICO directory plus payloads, ready to serialize
#[derive(Debug, Clone)]
pub struct IconContainer {
    entries: Vec<IconEntry>,
    payloads: Vec<Vec<u8>>,
}

impl IconContainer {
    /// Lay out `(width, height, png)` payloads back to back after the
    /// directory, in the given order.
    pub fn from_payloads(images: Vec<(u32, u32, Vec<u8>)>) -> Result<Self> {
        if images.len() > u16::MAX as usize {
            return Err(Error::Encoding(format!(
                "too many icon entries: {}",
                images.len()
            )));
        }

        let mut offset = HEADER_LEN + DIR_ENTRY_LEN * images.len();
        let mut entries = Vec::with_capacity(images.len());
        let mut payloads = Vec::with_capacity(images.len());

        for (width, height, payload) in images {
            let payload_size = u32::try_from(payload.len())
                .map_err(|_| Error::Encoding("icon payload exceeds 4 GiB".to_string()))?;
            let payload_offset = u32::try_from(offset)
                .map_err(|_| Error::Encoding("icon container exceeds 4 GiB".to_string()))?;

            entries.push(IconEntry {
                width,
                height,
                color_count: 0,
                planes: COLOR_PLANES,
                bits_per_pixel: BITS_PER_PIXEL,
                payload_size,
                payload_offset,
            });
            offset += payload.len();
            payloads.push(payload);
        }

        Ok(Self { entries, payloads })
    }

    pub fn entries(&self) -> &[IconEntry] {
        &self.entries
    }

    /// Serialize header, directory and payloads
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let total = HEADER_LEN
            + DIR_ENTRY_LEN * self.entries.len()
            + self.payloads.iter().map(Vec::len).sum::<usize>();
        let mut out = Vec::with_capacity(total);
        self.write(&mut out)
            .map_err(|e| Error::Encoding(format!("failed to write icon container: {}", e)))?;

        if out.len() != total {
            return Err(Error::Encoding(format!(
                "icon container is {} bytes, expected {}",
                out.len(),
                total
            )));
        }
        Ok(out)
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(RESOURCE_TYPE_ICON)?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;

        for entry in &self.entries {
            writer.write_u8(dimension_byte(entry.width))?;
            writer.write_u8(dimension_byte(entry.height))?;
            writer.write_u8(entry.color_count)?;
            writer.write_u8(0)?;
            writer.write_u16::<LittleEndian>(entry.planes)?;
            writer.write_u16::<LittleEndian>(entry.bits_per_pixel)?;
            writer.write_u32::<LittleEndian>(entry.payload_size)?;
            writer.write_u32::<LittleEndian>(entry.payload_offset)?;
        }

        for payload in &self.payloads {
            writer.write_all(payload)?;
        }
        Ok(())
    }
}

/// 256 does not fit in a byte; the format stores it as 0
fn dimension_byte(value: u32) -> u8 {
    if value >= 256 { 0 } else { value as u8 }
}

fn dimension_from_byte(value: u8) -> u32 {
    if value == 0 { 256 } else { value as u32 }
}

/// Encode an image as a standalone PNG stream
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8.into(),
    )?;
    Ok(buf)
}

/// Build an ICO container holding one resampled PNG per size.
///
/// Sizes are resampled and compressed in parallel; the directory is always
/// written in ascending size order.
pub fn encode(image: &RasterImage, sizes: &SizeSet) -> Result<Vec<u8>> {
    let images = sizes
        .as_slice()
        .par_iter()
        .map(|&size| -> Result<(u32, u32, Vec<u8>)> {
            let resized = resample(image, size, size)?;
            let png = encode_png(&resized)?;
            log::trace!("icon entry {}x{}: {} byte PNG", size, size, png.len());
            Ok((size, size, png))
        })
        .collect::<Result<Vec<_>>>()?;

    let container = IconContainer::from_payloads(images)?;
    let bytes = container.to_bytes()?;
    log::debug!(
        "encoded icon container with {} entries ({} bytes)",
        container.entries().len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Parse the header and directory of an ICO container.
///
/// Checks that every payload lies inside the buffer; payload contents are
/// not decoded.
pub fn read_directory(bytes: &[u8]) -> Result<Vec<IconEntry>> {
    let truncated = |_: io::Error| Error::Decode("icon container is truncated".to_string());
    let mut reader = Cursor::new(bytes);

    let reserved = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    if reserved != 0 {
        return Err(Error::Decode(format!(
            "invalid reserved field in icon header: {}",
            reserved
        )));
    }
    let resource_type = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    if resource_type != RESOURCE_TYPE_ICON {
        return Err(Error::Decode(format!(
            "not an icon container (type {})",
            resource_type
        )));
    }
    let count = reader.read_u16::<LittleEndian>().map_err(truncated)?;

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let width = dimension_from_byte(reader.read_u8().map_err(truncated)?);
        let height = dimension_from_byte(reader.read_u8().map_err(truncated)?);
        let color_count = reader.read_u8().map_err(truncated)?;
        let _reserved = reader.read_u8().map_err(truncated)?;
        let planes = reader.read_u16::<LittleEndian>().map_err(truncated)?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>().map_err(truncated)?;
        let payload_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let payload_offset = reader.read_u32::<LittleEndian>().map_err(truncated)?;

        let end = payload_offset as u64 + payload_size as u64;
        if end > bytes.len() as u64 {
            return Err(Error::Decode(format!(
                "icon payload {}..{} lies outside the {} byte container",
                payload_offset,
                end,
                bytes.len()
            )));
        }

        entries.push(IconEntry {
            width,
            height,
            color_count,
            planes,
            bits_per_pixel,
            payload_size,
            payload_offset,
        });
    }

    Ok(entries)
}
