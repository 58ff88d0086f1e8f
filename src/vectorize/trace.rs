//! Boundary tracing on the pixel crack grid
//!
//! Every side shared by a member pixel and a non-member (or the image
//! border) becomes a directed edge with the member on its right. Edges are
//! linked into closed loops; where two loops touch at a corner the walk
//! turns right, which keeps diagonally touching regions apart. Outer
//! boundaries come out clockwise (y down), holes counter-clockwise.

use super::mask::{ColorMask, create_cluster_mask, mask_population};
use super::quantize::ColorLabelMap;
use crate::types::{Point, Polygon};
use std::collections::BTreeMap;

const RIGHT: u8 = 0;
const DOWN: u8 = 1;
const LEFT: u8 = 2;
const UP: u8 = 3;

/// Edge bitmasks per grid vertex, `(width + 1) * (height + 1)` vertices
struct EdgeGrid {
    stride: usize,
    outgoing: Vec<u8>,
    visited: Vec<u8>,
}

impl EdgeGrid {
    fn new(width: usize, height: usize) -> Self {
        let len = (width + 1) * (height + 1);
        Self {
            stride: width + 1,
            outgoing: vec![0; len],
            visited: vec![0; len],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    fn add(&mut self, x: usize, y: usize, dir: u8) {
        let idx = self.index(x, y);
        self.outgoing[idx] |= 1 << dir;
    }

    fn has(&self, x: usize, y: usize, dir: u8) -> bool {
        self.outgoing[self.index(x, y)] & (1 << dir) != 0
    }

    fn is_unvisited(&self, x: usize, y: usize, dir: u8) -> bool {
        let idx = self.index(x, y);
        self.outgoing[idx] & (1 << dir) != 0 && self.visited[idx] & (1 << dir) == 0
    }

    fn visit(&mut self, x: usize, y: usize, dir: u8) {
        let idx = self.index(x, y);
        self.visited[idx] |= 1 << dir;
    }
}

fn step(x: usize, y: usize, dir: u8) -> (usize, usize) {
    match dir {
        RIGHT => (x + 1, y),
        DOWN => (x, y + 1),
        LEFT => (x - 1, y),
        _ => (x, y - 1),
    }
}

fn build_edges(mask: &ColorMask, width: usize, height: usize) -> EdgeGrid {
    let inside = |x: isize, y: isize| {
        x >= 0
            && y >= 0
            && (x as usize) < width
            && (y as usize) < height
            && mask[y as usize * width + x as usize] == 1
    };

    let mut grid = EdgeGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if mask[y * width + x] != 1 {
                continue;
            }
            let (ix, iy) = (x as isize, y as isize);
            if !inside(ix, iy - 1) {
                grid.add(x, y, RIGHT);
            }
            if !inside(ix + 1, iy) {
                grid.add(x + 1, y, DOWN);
            }
            if !inside(ix, iy + 1) {
                grid.add(x + 1, y + 1, LEFT);
            }
            if !inside(ix - 1, iy) {
                grid.add(x, y + 1, UP);
            }
        }
    }
    grid
}

/// Follow one loop starting with edge `(x, y, dir)`, keeping only the
/// vertices where the direction changes
fn walk_loop(grid: &mut EdgeGrid, start: (usize, usize, u8)) -> Vec<Point> {
    let (mut x, mut y, mut dir) = start;
    let mut points = Vec::new();

    loop {
        grid.visit(x, y, dir);
        (x, y) = step(x, y, dir);

        let next = [(dir + 1) % 4, dir, (dir + 3) % 4]
            .into_iter()
            .find(|&d| grid.has(x, y, d));
        let Some(next) = next else {
            // Every edge has a successor on a closed boundary
            log::warn!("open boundary at ({}, {}); dropping loop", x, y);
            return Vec::new();
        };

        if next != dir {
            points.push(Point::new(x as f64, y as f64));
        }
        dir = next;

        if (x, y, dir) == start {
            break;
        }
    }

    // Begin the polygon at the loop's starting vertex when it is a corner
    let origin = Point::new(start.0 as f64, start.1 as f64);
    if points.last() == Some(&origin) {
        points.rotate_right(1);
    }
    points
}

/// Trace all boundary loops of a binary mask.
///
/// Loops are returned in discovery order: pixels top-to-bottom,
/// left-to-right, and each pixel's sides top, right, bottom, left.
pub fn trace_mask(mask: &ColorMask, width: u32, height: u32) -> Vec<Polygon> {
    let (w, h) = (width as usize, height as usize);
    let mut grid = build_edges(mask, w, h);
    let mut polygons = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if mask[y * w + x] != 1 {
                continue;
            }
            let sides = [(x, y, RIGHT), (x + 1, y, DOWN), (x + 1, y + 1, LEFT), (x, y + 1, UP)];
            for start in sides {
                if grid.is_unvisited(start.0, start.1, start.2) {
                    let points = walk_loop(&mut grid, start);
                    if points.len() >= 4 {
                        polygons.push(Polygon::from_points(points));
                    }
                }
            }
        }
    }

    polygons
}

/// Trace the boundaries of every cluster, keyed by ascending cluster id
pub fn trace(map: &ColorLabelMap) -> BTreeMap<u16, Vec<Polygon>> {
    let mut contours = BTreeMap::new();

    for cluster in 0..map.palette().len() as u16 {
        let mask = create_cluster_mask(map, cluster);
        if mask_population(&mask) == 0 {
            continue;
        }
        let polygons = trace_mask(&mask, map.width(), map.height());
        log::trace!("cluster {}: {} contours", cluster, polygons.len());
        contours.insert(cluster, polygons);
    }

    contours
}
