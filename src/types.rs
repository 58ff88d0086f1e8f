use crate::error::{Error, Result};
use image::RgbaImage;

/// Smallest width/height an icon entry or vector canvas may have
pub const MIN_DIMENSION: u32 = 1;
/// Largest width/height an icon entry or vector canvas may have
pub const MAX_DIMENSION: u32 = 256;

/// Icon sizes used when the caller does not pass any
pub const DEFAULT_ICON_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

/// Vector canvas size used when the caller does not pass one
pub const DEFAULT_SVG_SIZE: u32 = 256;

/// RGBA8 color
pub type Color = [u8; 4];

pub(crate) fn dimension_in_range(value: u32) -> bool {
    (MIN_DIMENSION..=MAX_DIMENSION).contains(&value)
}

/// Decoded raster image with RGBA8 pixels in row-major order.
///
/// The buffer always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer, checking it against the declared dimensions.
    ///
    /// A mismatch is an [`Error::Encoding`]; decoders report it to callers
    /// as [`Error::Decode`].
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Encoding(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::Encoding(format!("image too large: {}x{}", width, height)))?;

        if pixels.len() != expected {
            return Err(Error::Encoding(format!(
                "pixel buffer holds {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image filled with a single color
    pub fn solid(width: u32, height: u32, color: Color) -> Result<Self> {
        let count = width as usize * height as usize;
        let pixels = color.iter().copied().cycle().take(count * 4).collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA8 bytes
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Iterate over pixels in row-major order
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
    }

    /// Copy into an `image` buffer, e.g. for PNG encoding
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            Error::Encoding(format!(
                "pixel buffer does not fit {}x{}",
                self.width, self.height
            ))
        })
    }
}

impl TryFrom<RgbaImage> for RasterImage {
    type Error = Error;

    fn try_from(img: RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

/// Deduplicated, ascending set of icon sizes, each within 1..=256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSet(Vec<u32>);

impl SizeSet {
    /// Normalize caller-provided sizes.
    ///
    /// Fails on an empty list, or with the first out-of-range value in
    /// input order.
    pub fn new(sizes: &[u32]) -> Result<Self> {
        if sizes.is_empty() {
            return Err(Error::SizeRange { size: None });
        }

        if let Some(&bad) = sizes.iter().find(|&&s| !dimension_in_range(s)) {
            return Err(Error::SizeRange { size: Some(bad) });
        }

        let mut sizes = sizes.to_vec();
        sizes.sort_unstable();
        sizes.dedup();
        Ok(Self(sizes))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl Default for SizeSet {
    fn default() -> Self {
        Self(DEFAULT_ICON_SIZES.to_vec())
    }
}

/// 2D point in canvas coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Perpendicular distance from `self` to the segment `a`-`b`
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(&Point::new(a.x + t * dx, a.y + t * dy))
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Orientation of a closed polygon as seen on screen (y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Outer boundary
    Clockwise,
    /// Hole
    CounterClockwise,
}

/// Closed polygon; the last point connects back to the first
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub winding: Winding,
}

impl Polygon {
    /// Build a polygon, deriving the winding from the signed area
    pub fn from_points(points: Vec<Point>) -> Self {
        let winding = if signed_area(&points) >= 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        };
        Self { points, winding }
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.points).abs()
    }

    pub fn is_hole(&self) -> bool {
        self.winding == Winding::CounterClockwise
    }
}

/// Shoelace area; positive for clockwise loops in y-down coordinates
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// One edge of a subpath, ending at `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line(Point),
    Cubic { ctrl1: Point, ctrl2: Point, to: Point },
}

impl PathSegment {
    pub fn end(&self) -> Point {
        match self {
            PathSegment::Line(to) | PathSegment::Cubic { to, .. } => *to,
        }
    }
}

/// Closed subpath: a start point and the segments walking back to it
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub start: Point,
    pub segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn as_svg(&self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }
}

/// Filled shape made of one or more closed subpaths
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPath {
    pub subpaths: Vec<Subpath>,
    pub fill: Color,
    pub fill_rule: FillRule,
}

impl VectorPath {
    pub fn new(fill: Color) -> Self {
        Self {
            subpaths: Vec::new(),
            fill,
            fill_rule: FillRule::NonZero,
        }
    }

    /// Append the subpaths of `other`, keeping this path's fill
    pub fn merge(&mut self, other: VectorPath) {
        self.subpaths.extend(other.subpaths);
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }
}

/// Canvas plus paths in back-to-front paint order
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    pub width: u32,
    pub height: u32,
    pub paths: Vec<VectorPath>,
}
