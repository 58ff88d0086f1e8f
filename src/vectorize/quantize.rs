//! Median-cut color quantization
//!
//! Produces a bounded palette and one label per pixel. Pixels that are
//! mostly transparent share a single fully transparent palette entry so
//! they never leak into the opaque colors.

use crate::types::{Color, RasterImage};
use std::collections::{BTreeMap, HashMap};

/// Pixels with alpha below this are treated as transparent
pub const TRANSPARENT_ALPHA_THRESHOLD: u8 = 128;

/// Palette bound used when the caller does not choose one
pub const DEFAULT_MAX_COLORS: usize = 32;

const TRANSPARENT: Color = [0, 0, 0, 0];

/// Per-pixel cluster labels plus the palette they index into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLabelMap {
    width: u32,
    height: u32,
    labels: Vec<u16>,
    palette: Vec<Color>,
}

impl ColorLabelMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major labels, one per pixel
    pub fn labels(&self) -> &[u16] {
        &self.labels
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn label(&self, x: u32, y: u32) -> u16 {
        self.labels[y as usize * self.width as usize + x as usize]
    }
}

/// A set of distinct colors with their pixel counts
struct ColorBox {
    colors: Vec<(Color, u32)>,
}

impl ColorBox {
    fn channel_range(&self, channel: usize) -> u8 {
        let (min, max) = self
            .colors
            .iter()
            .fold((u8::MAX, u8::MIN), |(min, max), (c, _)| {
                (min.min(c[channel]), max.max(c[channel]))
            });
        max.saturating_sub(min)
    }

    /// Widest RGB channel, ties resolved R, G, B
    fn widest_channel(&self) -> (usize, u8) {
        let mut best = (0, self.channel_range(0));
        for channel in 1..3 {
            let range = self.channel_range(channel);
            if range > best.1 {
                best = (channel, range);
            }
        }
        best
    }

    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    /// Split at the count-weighted median of the widest channel
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.colors.sort_by_key(|(c, _)| (c[channel], *c));

        let total: u64 = self.colors.iter().map(|(_, n)| *n as u64).sum();
        let mut acc = 0u64;
        let mut split_at = self.colors.len() - 1;
        for (i, (_, n)) in self.colors.iter().enumerate() {
            acc += *n as u64;
            if acc * 2 >= total {
                split_at = i + 1;
                break;
            }
        }
        let split_at = split_at.clamp(1, self.colors.len() - 1);

        let upper = self.colors.split_off(split_at);
        (self, ColorBox { colors: upper })
    }

    /// Count-weighted mean color, alpha included
    fn mean(&self) -> Color {
        let mut sums = [0u64; 4];
        let mut total = 0u64;
        for (c, n) in &self.colors {
            let n = *n as u64;
            for (sum, v) in sums.iter_mut().zip(c) {
                *sum += *v as u64 * n;
            }
            total += n;
        }
        let total = total.max(1);
        sums.map(|s| ((s + total / 2) / total) as u8)
    }
}

fn rgb_distance(a: &Color, b: &Color) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Index of the nearest candidate; ties go to the lowest index
fn nearest(color: &Color, palette: &[Color]) -> usize {
    let mut best = 0;
    let mut best_dist = u32::MAX;
    for (idx, candidate) in palette.iter().enumerate() {
        let dist = rgb_distance(color, candidate);
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }
    best
}

fn is_transparent(color: &Color) -> bool {
    color[3] < TRANSPARENT_ALPHA_THRESHOLD
}

fn median_cut(histogram: BTreeMap<Color, u32>, budget: usize) -> Vec<Color> {
    if histogram.is_empty() {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox {
        colors: histogram.into_iter().collect(),
    }];

    while boxes.len() < budget {
        // Largest range first; on ties the earliest box wins
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by(|(ia, a), (ib, b)| {
                a.widest_channel()
                    .1
                    .cmp(&b.widest_channel().1)
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i);

        let Some(idx) = candidate else {
            break;
        };

        let (lower, upper) = boxes.remove(idx).split();
        boxes.insert(idx, upper);
        boxes.insert(idx, lower);
    }

    boxes.iter().map(ColorBox::mean).collect()
}

/// Reduce `image` to at most `max_colors` palette entries.
///
/// `max_colors` is clamped to 2..=256. Palette entries are ordered by
/// descending pixel count (ties by color), so label 0 is always the
/// dominant color.
pub fn quantize(image: &RasterImage, max_colors: usize) -> ColorLabelMap {
    let max_colors = max_colors.clamp(2, 256);

    let mut histogram: BTreeMap<Color, u32> = BTreeMap::new();
    let mut has_transparent = false;
    for color in image.colors() {
        if is_transparent(&color) {
            has_transparent = true;
        } else {
            *histogram.entry(color).or_insert(0) += 1;
        }
    }

    let budget = max_colors - usize::from(has_transparent);
    let distinct = histogram.len();
    let opaque = median_cut(histogram, budget);

    // Assign every pixel, caching per distinct color
    let transparent_idx = opaque.len();
    let mut cache: HashMap<Color, usize> = HashMap::new();
    let raw_labels: Vec<usize> = image
        .colors()
        .map(|color| {
            if is_transparent(&color) {
                transparent_idx
            } else {
                *cache
                    .entry(color)
                    .or_insert_with(|| nearest(&color, &opaque))
            }
        })
        .collect();

    let mut candidates = opaque;
    candidates.push(TRANSPARENT);

    let mut counts = vec![0u32; candidates.len()];
    for &label in &raw_labels {
        counts[label] += 1;
    }

    let mut order: Vec<usize> = (0..candidates.len()).filter(|&i| counts[i] > 0).collect();
    order.sort_by(|&a, &b| {
        counts[b]
            .cmp(&counts[a])
            .then(candidates[a].cmp(&candidates[b]))
    });

    let mut remap = vec![0u16; candidates.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new as u16;
    }

    let palette: Vec<Color> = order.iter().map(|&i| candidates[i]).collect();
    let labels = raw_labels.into_iter().map(|l| remap[l]).collect();

    log::debug!(
        "quantized {} distinct colors into {} palette entries",
        distinct,
        palette.len()
    );

    ColorLabelMap {
        width: image.width(),
        height: image.height(),
        labels,
        palette,
    }
}
