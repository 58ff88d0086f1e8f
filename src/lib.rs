//! # imgico
//!
//! A Rust library for turning a single raster image into platform icons and
//! lightweight vector thumbnails.
//!
//! ## Features
//!
//! - **ICO**: Pack several Lanczos-resampled PNG copies of an image into one
//!   `.ico` container
//! - **SVG**: Trace an image into filled, curve-fitted vector paths
//!
//! ## Example - ICO
//!
//! ```rust,ignore
//! let png = std::fs::read("logo.png").unwrap();
//! let ico = imgico::imgico(&png, None).unwrap();
//! std::fs::write("logo.ico", ico).unwrap();
//! ```
//!
//! ## Example - SVG
//!
//! ```rust,ignore
//! let png = std::fs::read("logo.png").unwrap();
//! let svg = imgico::imgsvg(&png, Some(128)).unwrap();
//! std::fs::write("logo.svg", svg).unwrap();
//! ```

pub mod convert;
pub mod decode;
pub mod error;
pub mod ico;
pub mod resample;
pub mod svg;
pub mod types;
pub mod vectorize;

// Re-export commonly used items
pub use convert::{
    IcoOptions, SvgOptions, ico_from_image, imgico, imgico_with_options, imgsvg,
    imgsvg_with_options, svg_from_image, vector_document,
};
pub use decode::{RasterDecoder, decode};
pub use error::{Error, Result};
pub use resample::resample;
pub use types::{
    DEFAULT_ICON_SIZES, DEFAULT_SVG_SIZE, FillRule, PathSegment, Point, Polygon, RasterImage,
    SizeSet, Subpath, VectorDocument, VectorPath, Winding,
};
