//! Polygon simplification and curve fitting
//!
//! 1. Closed Douglas-Peucker reduction within `tolerance`
//! 2. Corner classification by turning angle
//! 3. Cubic segments with Catmull-Rom tangents through smooth vertices,
//!    straight edges between corners and for near-linear spans

use crate::types::{PathSegment, Point, Polygon, Subpath, VectorPath};

/// Vertices turning more sharply than this are kept as hard corners
pub const CORNER_ANGLE_DEGREES: f64 = 60.0;

/// Smallest tolerance ever used, in canvas units
pub const MIN_TOLERANCE: f64 = 0.5;

/// Simplification tolerance for a square canvas of `size` units.
///
/// One unit per 256, so a trace looks the same at every output size.
pub fn tolerance_for_canvas(size: u32) -> f64 {
    (size as f64 / 256.0).max(MIN_TOLERANCE)
}

/// Douglas-Peucker over `ring[first..=last]`, marking kept indices
fn douglas_peucker(ring: &[Point], first: usize, last: usize, tolerance: f64, keep: &mut [bool]) {
    let mut stack = vec![(first, last)];

    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in start + 1..end {
            let dist = ring[i].distance_to_segment(&ring[start], &ring[end]);
            if dist > max_dist {
                max_dist = dist;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((max_idx, end));
            stack.push((start, max_idx));
        }
    }
}

/// Reduce a closed polygon, anchoring on the first vertex and the vertex
/// farthest from it
pub fn simplify_closed(points: &[Point], tolerance: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let origin = points[0];
    let mut far = 0;
    let mut far_dist = 0.0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let dist = origin.distance(p);
        if dist > far_dist {
            far_dist = dist;
            far = i;
        }
    }
    if far == 0 {
        return vec![origin];
    }

    let mut ring = points.to_vec();
    ring.push(origin);
    let mut keep = vec![false; n + 1];
    keep[0] = true;
    keep[far] = true;

    douglas_peucker(&ring, 0, far, tolerance, &mut keep);
    douglas_peucker(&ring, far, n, tolerance, &mut keep);

    points
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .map(|(p, _)| *p)
        .collect()
}

/// Absolute turning angle at `b` walking `a -> b -> c`, in degrees
fn turning_angle(a: Point, b: Point, c: Point) -> f64 {
    let v1 = b - a;
    let v2 = c - b;
    let cross = v1.x * v2.y - v1.y * v2.x;
    let dot = v1.x * v2.x + v1.y * v2.y;
    cross.atan2(dot).abs().to_degrees()
}

/// Fit segments through the vertices of a closed, already simplified loop
pub fn fit_curves(points: &[Point], tolerance: f64) -> Subpath {
    let n = points.len();
    let at = |i: usize| points[i % n];
    let prev = |i: usize| points[(i + n - 1) % n];

    let corners: Vec<bool> = (0..n)
        .map(|i| turning_angle(prev(i), at(i), at(i + 1)) > CORNER_ANGLE_DEGREES)
        .collect();

    let segments = (0..n)
        .map(|i| {
            let p0 = at(i);
            let p1 = at(i + 1);
            let next = (i + 1) % n;

            if corners[i] && corners[next] {
                return PathSegment::Line(p1);
            }

            let ctrl1 = if corners[i] {
                p0 + (p1 - p0) * (1.0 / 3.0)
            } else {
                p0 + (p1 - prev(i)) * (1.0 / 6.0)
            };
            let ctrl2 = if corners[next] {
                p1 - (p1 - p0) * (1.0 / 3.0)
            } else {
                p1 - (at(i + 2) - p0) * (1.0 / 6.0)
            };

            let near_linear = ctrl1.distance_to_segment(&p0, &p1) <= tolerance
                && ctrl2.distance_to_segment(&p0, &p1) <= tolerance;
            if near_linear {
                PathSegment::Line(p1)
            } else {
                PathSegment::Cubic {
                    ctrl1,
                    ctrl2,
                    to: p1,
                }
            }
        })
        .collect();

    Subpath {
        start: points[0],
        segments,
    }
}

/// Whether the polygon's bounding box is at most `2 * tolerance` across
fn is_thin(points: &[Point], tolerance: f64) -> bool {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).min(max_y - min_y) <= 2.0 * tolerance
}

/// Simplify one polygon into a path with a single subpath.
///
/// The fill is left transparent for the caller to set. Thin polygons keep
/// their traced vertices, and a reduction that leaves fewer than three
/// vertices falls back to the traced ring, so a region never disappears.
/// Only inputs with fewer than three vertices produce an empty path.
pub fn simplify(polygon: &Polygon, tolerance: f64) -> VectorPath {
    let mut path = VectorPath::new([0, 0, 0, 0]);
    if polygon.points.len() < 3 {
        return path;
    }

    let points = if is_thin(&polygon.points, tolerance) {
        polygon.points.clone()
    } else {
        let reduced = simplify_closed(&polygon.points, tolerance);
        if reduced.len() >= 3 {
            reduced
        } else {
            polygon.points.clone()
        }
    };
    path.subpaths.push(fit_curves(&points, tolerance));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Polygon {
        Polygon::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ])
    }

    #[test]
    fn test_tolerance_scales_with_canvas() {
        assert_eq!(tolerance_for_canvas(16), MIN_TOLERANCE);
        assert_eq!(tolerance_for_canvas(256), 1.0);
        assert!(tolerance_for_canvas(200) < tolerance_for_canvas(256));
    }

    #[test]
    fn test_square_stays_square() {
        let path = simplify(&square(256.0), 1.0);
        assert_eq!(path.subpaths.len(), 1);
        let sub = &path.subpaths[0];
        assert_eq!(sub.start, Point::new(0.0, 0.0));
        assert_eq!(
            sub.segments,
            vec![
                PathSegment::Line(Point::new(256.0, 0.0)),
                PathSegment::Line(Point::new(256.0, 256.0)),
                PathSegment::Line(Point::new(0.0, 256.0)),
                PathSegment::Line(Point::new(0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_staircase_collapses() {
        // 45 degree staircase along the diagonal of a triangle
        let mut points = vec![Point::new(0.0, 0.0)];
        for i in 0..20 {
            points.push(Point::new(i as f64 + 1.0, i as f64));
            points.push(Point::new(i as f64 + 1.0, i as f64 + 1.0));
        }
        points.push(Point::new(0.0, 20.0));
        let polygon = Polygon::from_points(points);

        let reduced = simplify_closed(&polygon.points, 1.0);
        assert!(reduced.len() <= 4, "got {} points", reduced.len());
    }

    #[test]
    fn test_tiny_polygon_survives() {
        let path = simplify(&square(1.0), 1.0);
        assert_eq!(path.subpaths.len(), 1);
        assert_eq!(path.subpaths[0].segments.len(), 4);
    }

    #[test]
    fn test_single_column_keeps_its_corners() {
        let column = Polygon::from_points(vec![
            Point::new(128.0, 0.0),
            Point::new(129.0, 0.0),
            Point::new(129.0, 256.0),
            Point::new(128.0, 256.0),
        ]);
        // Reduction alone would collapse it to a segment
        assert!(simplify_closed(&column.points, 1.0).len() < 3);

        let path = simplify(&column, 1.0);
        assert_eq!(path.subpaths.len(), 1);
        assert_eq!(
            path.subpaths[0].segments,
            vec![
                PathSegment::Line(Point::new(129.0, 0.0)),
                PathSegment::Line(Point::new(129.0, 256.0)),
                PathSegment::Line(Point::new(128.0, 256.0)),
                PathSegment::Line(Point::new(128.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_degenerate_input_is_empty() {
        let line = Polygon::from_points(vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]);
        assert!(simplify(&line, 1.0).is_empty());
    }

    #[test]
    fn test_smooth_shape_gets_curves() {
        let points: Vec<Point> = (0..12)
            .map(|i| {
                let t = i as f64 / 12.0 * std::f64::consts::TAU;
                Point::new(100.0 + 80.0 * t.cos(), 100.0 + 80.0 * t.sin())
            })
            .collect();
        let path = simplify(&Polygon::from_points(points), 1.0);
        let sub = &path.subpaths[0];
        assert!(
            sub.segments
                .iter()
                .any(|s| matches!(s, PathSegment::Cubic { .. }))
        );
        assert_eq!(sub.segments.last().unwrap().end(), sub.start);
    }

    #[test]
    fn test_turning_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!((turning_angle(a, b, Point::new(2.0, 0.0))).abs() < 1e-9);
        assert!((turning_angle(a, b, Point::new(1.0, 1.0)) - 90.0).abs() < 1e-9);
    }
}
