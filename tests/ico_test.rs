//! Integration tests for ICO conversion

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imgico::ico::{DIR_ENTRY_LEN, HEADER_LEN, read_directory};
use imgico::{Error, imgico};
use std::io::Cursor;

fn create_solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
    img
}

fn encode(img: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

fn png_fixture() -> Vec<u8> {
    let mut img = create_solid_image(64, 48, Rgba([30, 144, 255, 255]));
    for y in 10..30 {
        for x in 20..40 {
            img.put_pixel(x, y, Rgba([255, 215, 0, 255]));
        }
    }
    encode(img, ImageFormat::Png)
}

#[test]
fn test_default_sizes_directory() {
    let ico = imgico(&png_fixture(), None).unwrap();
    let entries = read_directory(&ico).unwrap();

    let sizes: Vec<u32> = entries.iter().map(|e| e.width).collect();
    assert_eq!(sizes, vec![16, 32, 48, 64, 128, 256]);
    assert_eq!(&ico[0..6], &[0, 0, 1, 0, 6, 0]);

    // Payloads follow the directory back to back
    let mut offset = (HEADER_LEN + DIR_ENTRY_LEN * entries.len()) as u32;
    for entry in &entries {
        assert_eq!(entry.width, entry.height);
        assert_eq!(entry.planes, 1);
        assert_eq!(entry.bits_per_pixel, 32);
        assert_eq!(entry.payload_offset, offset);
        offset += entry.payload_size;
    }
    assert_eq!(offset as usize, ico.len());
}

#[test]
fn test_payloads_are_pngs_of_entry_size() {
    let ico = imgico(&png_fixture(), Some(&[16, 256])).unwrap();
    let entries = read_directory(&ico).unwrap();
    assert_eq!(entries.len(), 2);

    for entry in entries {
        let start = entry.payload_offset as usize;
        let payload = &ico[start..start + entry.payload_size as usize];
        assert_eq!(&payload[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory_with_format(payload, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (entry.width, entry.height));
    }
}

#[test]
fn test_256_stored_as_zero() {
    let ico = imgico(&png_fixture(), Some(&[256])).unwrap();
    assert_eq!(ico[HEADER_LEN], 0);
    assert_eq!(ico[HEADER_LEN + 1], 0);
}

#[test]
fn test_sizes_are_normalized() {
    let input = png_fixture();
    let messy = imgico(&input, Some(&[64, 16, 16, 32])).unwrap();
    let clean = imgico(&input, Some(&[16, 32, 64])).unwrap();
    assert_eq!(messy, clean);
}

#[test]
fn test_solid_color_survives() {
    let input = encode(
        create_solid_image(40, 40, Rgba([200, 10, 90, 255])),
        ImageFormat::Png,
    );
    let ico = imgico(&input, Some(&[16])).unwrap();
    let entry = read_directory(&ico).unwrap()[0];
    let start = entry.payload_offset as usize;
    let decoded = image::load_from_memory(&ico[start..start + entry.payload_size as usize])
        .unwrap()
        .to_rgba8();

    assert!(decoded.pixels().all(|p| *p == Rgba([200, 10, 90, 255])));
}

#[test]
fn test_size_range_errors() {
    let input = png_fixture();
    assert_eq!(imgico(&input, Some(&[])), Err(Error::SizeRange { size: None }));
    assert_eq!(
        imgico(&input, Some(&[0])),
        Err(Error::SizeRange { size: Some(0) })
    );
    assert_eq!(
        imgico(&input, Some(&[16, 300])),
        Err(Error::SizeRange { size: Some(300) })
    );
}

#[test]
fn test_decode_errors() {
    assert!(matches!(imgico(&[], None), Err(Error::Decode(_))));
    assert!(matches!(
        imgico(b"definitely not an image", None),
        Err(Error::Decode(_))
    ));

    let png = png_fixture();
    assert!(matches!(
        imgico(&png[..png.len() / 2], None),
        Err(Error::Decode(_))
    ));
}

#[test]
fn test_other_input_formats() {
    let img = create_solid_image(20, 20, Rgba([0, 128, 0, 255]));
    let bmp = encode(img.clone(), ImageFormat::Bmp);
    let gif = encode(img.clone(), ImageFormat::Gif);
    let webp = encode(img.clone(), ImageFormat::WebP);

    let mut jpeg = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .to_rgb8()
        .write_to(&mut jpeg, ImageFormat::Jpeg)
        .unwrap();

    for input in [bmp, gif, webp, jpeg.into_inner()] {
        let ico = imgico(&input, Some(&[16, 32])).unwrap();
        assert_eq!(read_directory(&ico).unwrap().len(), 2);
    }
}

#[test]
fn test_lossless_formats_keep_color() {
    let img = create_solid_image(12, 12, Rgba([250, 120, 0, 255]));

    for format in [ImageFormat::Gif, ImageFormat::WebP] {
        let ico = imgico(&encode(img.clone(), format), Some(&[16])).unwrap();
        let entry = read_directory(&ico).unwrap()[0];
        let start = entry.payload_offset as usize;
        let decoded = image::load_from_memory(&ico[start..start + entry.payload_size as usize])
            .unwrap()
            .to_rgba8();
        assert!(
            decoded.pixels().all(|p| *p == Rgba([250, 120, 0, 255])),
            "{format:?}"
        );
    }
}

#[test]
fn test_non_square_input_fills_every_entry() {
    // Left half red, right half blue
    let mut img = create_solid_image(40, 10, Rgba([0, 0, 255, 255]));
    for y in 0..10 {
        for x in 0..20 {
            img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        }
    }
    let ico = imgico(&encode(img, ImageFormat::Png), Some(&[16])).unwrap();
    let entry = read_directory(&ico).unwrap()[0];
    let start = entry.payload_offset as usize;
    let decoded = image::load_from_memory(&ico[start..start + entry.payload_size as usize])
        .unwrap()
        .to_rgba8();

    assert_eq!(decoded.dimensions(), (16, 16));
    assert!(decoded.pixels().all(|p| p[3] == 255), "no letterbox bars");
    for y in 0..16 {
        assert_eq!(*decoded.get_pixel(0, y), Rgba([255, 0, 0, 255]));
        assert_eq!(*decoded.get_pixel(15, y), Rgba([0, 0, 255, 255]));
    }
}

#[test]
fn test_deterministic_output() {
    let input = png_fixture();
    assert_eq!(imgico(&input, None).unwrap(), imgico(&input, None).unwrap());
}
