//! Vertex paths with arc segments
//!
//! A [`Path`] is a list of vertices where each vertex stores the arc angle of
//! the segment that starts at it (zero for a straight line). The last vertex'
//! angle is unused. Closed outlines repeat their first vertex at the end.

use super::units::{Angle, Length, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Upper bound for the number of chords generated for a single arc
const MAX_ARC_SEGMENTS: usize = 4096;

/// Coordinates closer than this to an integer are treated as exact
const SNAP_EPSILON: f64 = 1e-6;

/// A path vertex and the arc angle of the segment leaving it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Point,
    #[serde(default)]
    pub angle: Angle,
}

impl Vertex {
    pub fn new(pos: Point, angle: Angle) -> Self {
        Self { pos, angle }
    }

    pub fn straight(pos: Point) -> Self {
        Self::new(pos, Angle::ZERO)
    }
}

/// Which side of the true curve the flattened chords may lie on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlattenMode {
    /// The polygon covers at least the true area (keep-out zones, copper)
    Outward,
    /// The polygon stays within the true area (required coverage)
    Inward,
}

impl FlattenMode {
    pub fn inverted(self) -> Self {
        match self {
            FlattenMode::Outward => FlattenMode::Inward,
            FlattenMode::Inward => FlattenMode::Outward,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    vertices: Vec<Vertex>,
}

impl Path {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// Path made of straight segments only
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        Self::new(points.into_iter().map(Vertex::straight).collect())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) => self.vertices.len() > 1 && first.pos == last.pos,
            _ => false,
        }
    }

    /// Whether any segment of the path is an arc
    pub fn is_curved(&self) -> bool {
        let segments = self.vertices.len().saturating_sub(1);
        self.vertices[..segments].iter().any(|v| !v.angle.is_zero())
    }

    /// Same path, closed by a straight segment back to the start if needed
    pub fn closed(&self) -> Path {
        let mut path = self.clone();
        if let Some(first) = self.vertices.first() {
            if !self.is_closed() {
                if let Some(last) = path.vertices.last_mut() {
                    last.angle = Angle::ZERO;
                }
                path.vertices.push(Vertex::straight(first.pos));
            }
        }
        path
    }

    pub fn map_vertices<P, A>(&self, map_pos: P, map_angle: A) -> Path
    where
        P: Fn(Point) -> Point,
        A: Fn(Angle) -> Angle,
    {
        Path::new(
            self.vertices
                .iter()
                .map(|v| Vertex::new(map_pos(v.pos), map_angle(v.angle)))
                .collect(),
        )
    }

    pub fn translated(&self, offset: Point) -> Path {
        self.map_vertices(|p| p + offset, |a| a)
    }

    /// Same outline traversed in the opposite direction
    pub fn reversed(&self) -> Path {
        let n = self.vertices.len();
        let vertices = (0..n)
            .rev()
            .map(|i| {
                let angle = if i > 0 {
                    -self.vertices[i - 1].angle
                } else {
                    Angle::ZERO
                };
                Vertex::new(self.vertices[i].pos, angle)
            })
            .collect();
        Path::new(vertices)
    }

    // --- canonical shapes -------------------------------------------------

    /// Straight or arc segment between two points
    pub fn line(p1: Point, p2: Point, angle: Angle) -> Path {
        Path::new(vec![Vertex::new(p1, angle), Vertex::straight(p2)])
    }

    /// Circle centered at the origin
    pub fn circle(diameter: Length) -> Path {
        let r = diameter.nm() / 2;
        Path::new(vec![
            Vertex::new(Point::from_nm(r, 0), Angle::DEG180),
            Vertex::new(Point::from_nm(-r, 0), Angle::DEG180),
            Vertex::straight(Point::from_nm(r, 0)),
        ])
    }

    pub fn circle_at(center: Point, diameter: Length) -> Path {
        Path::circle(diameter).translated(center)
    }

    /// Rectangle centered at the origin
    pub fn centered_rect(width: Length, height: Length) -> Path {
        let (w, h) = (width.nm() / 2, height.nm() / 2);
        Path::from_points([
            Point::from_nm(-w, -h),
            Point::from_nm(w, -h),
            Point::from_nm(w, h),
            Point::from_nm(-w, h),
            Point::from_nm(-w, -h),
        ])
    }

    /// Axis-aligned rectangle spanned by two corners
    pub fn rect(p1: Point, p2: Point) -> Path {
        let (x0, x1) = (p1.x.min(p2.x), p1.x.max(p2.x));
        let (y0, y1) = (p1.y.min(p2.y), p1.y.max(p2.y));
        Path::from_points([
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
            Point::new(x0, y0),
        ])
    }

    /// Octagon with chamfered corners, centered at the origin
    pub fn octagon(width: Length, height: Length) -> Path {
        let rx = width.nm() / 2;
        let ry = height.nm() / 2;
        let a = (rx.min(ry) as f64 * (2.0 - std::f64::consts::SQRT_2)).round() as i64;
        Path::from_points([
            Point::from_nm(rx, ry - a),
            Point::from_nm(rx - a, ry),
            Point::from_nm(-rx + a, ry),
            Point::from_nm(-rx, ry - a),
            Point::from_nm(-rx, -ry + a),
            Point::from_nm(-rx + a, -ry),
            Point::from_nm(rx - a, -ry),
            Point::from_nm(rx, -ry + a),
            Point::from_nm(rx, ry - a),
        ])
    }

    /// Stadium shape of the given total width and height, centered at the origin
    pub fn obround_centered(width: Length, height: Length) -> Path {
        if width > height {
            let dx = (width - height) / 2;
            Path::obround(Point::new(-dx, Length::ZERO), Point::new(dx, Length::ZERO), height)
        } else if height > width {
            let dy = (height - width) / 2;
            Path::obround(Point::new(Length::ZERO, -dy), Point::new(Length::ZERO, dy), width)
        } else {
            Path::circle(width)
        }
    }

    /// Capsule around the segment `p1`-`p2` with round caps
    pub fn obround(p1: Point, p2: Point, width: Length) -> Path {
        if p1 == p2 {
            return Path::circle_at(p1, width);
        }
        let r = width.nm() as f64 / 2.0;
        let (x1, y1) = p1.to_f64();
        let (x2, y2) = p2.to_f64();
        let len = (x2 - x1).hypot(y2 - y1);
        let (nx, ny) = (-(y2 - y1) / len * r, (x2 - x1) / len * r);
        // Side points move away from the centerline when snapped, by the same
        // amount at both ends, so the caps stay centered on the endpoints
        let offset = |p: (f64, f64), s: f64| {
            Point::from_f64(snap_away(p.0 + s * nx, p.0), snap_away(p.1 + s * ny, p.1))
        };
        let a = offset((x1, y1), -1.0);
        Path::new(vec![
            Vertex::straight(a),
            Vertex::new(offset((x2, y2), -1.0), Angle::DEG180),
            Vertex::straight(offset((x2, y2), 1.0)),
            Vertex::new(offset((x1, y1), 1.0), Angle::DEG180),
            Vertex::straight(a),
        ])
    }

    /// Stroke outline of an arc segment from `p1` to `p2`
    pub fn arc_obround(p1: Point, p2: Point, angle: Angle, width: Length) -> Path {
        let Some((cx, cy, radius)) = arc_center(p1.to_f64(), p2.to_f64(), angle.to_rad()) else {
            return Path::obround(p1, p2, width);
        };
        let r = width.nm() as f64 / 2.0;
        if radius <= r {
            // Inner edge collapses: the stroke is contained in this disc
            let center = Point::from_f64(cx, cy);
            return Path::circle_at(center, Length::from_nm((2.0 * (radius + r)).ceil() as i64));
        }
        let at = |p: Point, dist: f64| {
            let (px, py) = p.to_f64();
            let (ux, uy) = ((px - cx) / radius, (py - cy) / radius);
            Point::from_f64(cx + ux * dist, cy + uy * dist)
        };
        let cap = if angle.microdeg() > 0 {
            Angle::DEG180
        } else {
            -Angle::DEG180
        };
        let outer1 = at(p1, radius + r);
        Path::new(vec![
            Vertex::new(outer1, angle),
            Vertex::new(at(p2, radius + r), cap),
            Vertex::new(at(p2, radius - r), -angle),
            Vertex::new(at(p1, radius - r), cap),
            Vertex::straight(outer1),
        ])
    }

    /// One closed stroke outline per segment. A single vertex gives a disc.
    pub fn to_outline_strokes(&self, width: Length) -> Vec<Path> {
        match self.vertices.as_slice() {
            [] => vec![],
            [single] => vec![Path::circle_at(single.pos, width)],
            vertices => vertices
                .windows(2)
                .map(|pair| {
                    if pair[0].angle.is_zero() {
                        Path::obround(pair[0].pos, pair[1].pos, width)
                    } else {
                        Path::arc_obround(pair[0].pos, pair[1].pos, pair[0].angle, width)
                    }
                })
                .collect(),
        }
    }

    // --- flattening -------------------------------------------------------

    /// Signed enclosed area (positive for counter-clockwise), arcs included
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 2 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let v = self.vertices[i];
            let next = self.vertices[(i + 1) % n];
            let (x1, y1) = v.pos.to_f64();
            let (x2, y2) = next.pos.to_f64();
            area += (x1 * y2 - x2 * y1) / 2.0;
            if i + 1 < n && !v.angle.is_zero() {
                let alpha = v.angle.to_rad();
                if let Some((_, _, r)) = arc_center((x1, y1), (x2, y2), alpha) {
                    let theta = alpha.abs();
                    area += alpha.signum() * r * r / 2.0 * (theta - theta.sin());
                }
            }
        }
        area
    }

    /// Approximate the outline by straight chords on the nanometer grid.
    ///
    /// The returned ring is implicitly closed (the first point is not
    /// repeated). Every chord lies within `tolerance` of the true arc, on the
    /// side selected by `mode` relative to the area the path encloses.
    pub fn flatten(&self, tolerance: Length, mode: FlattenMode) -> Vec<(f64, f64)> {
        let ccw = self.signed_area() >= 0.0;
        let tolerance = (tolerance.nm() as f64).max(1.0);
        let mut ring: Vec<(f64, f64)> = Vec::with_capacity(self.vertices.len());
        let n = self.vertices.len();
        for (i, v) in self.vertices.iter().enumerate() {
            ring.push(v.pos.to_f64());
            if i + 1 == n || v.angle.is_zero() {
                continue;
            }
            let next = self.vertices[i + 1];
            let convex = (v.angle.microdeg() > 0) == ccw;
            let circumscribe = convex == (mode == FlattenMode::Outward);
            push_arc_points(&mut ring, v.pos, next.pos, v.angle, tolerance, circumscribe);
        }
        ring.dedup();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    }
}

/// Center and radius of the arc from `p1` to `p2` sweeping `alpha` radians
fn arc_center(p1: (f64, f64), p2: (f64, f64), alpha: f64) -> Option<(f64, f64, f64)> {
    let (vx, vy) = (p2.0 - p1.0, p2.1 - p1.1);
    let chord = vx.hypot(vy);
    let half = alpha / 2.0;
    if chord == 0.0 || half.sin() == 0.0 {
        return None;
    }
    let radius = chord / (2.0 * half.sin().abs());
    let k = 1.0 / (2.0 * half.tan());
    let (mx, my) = ((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    Some((mx - vy * k, my + vx * k, radius))
}

/// Intermediate arc points, endpoints excluded
fn push_arc_points(
    ring: &mut Vec<(f64, f64)>,
    p1: Point,
    p2: Point,
    angle: Angle,
    tolerance: f64,
    circumscribe: bool,
) {
    let start = p1.to_f64();
    let alpha = angle.to_rad();
    let Some((cx, cy, r)) = arc_center(start, p2.to_f64(), alpha) else {
        return;
    };
    let max_step = if circumscribe {
        2.0 * (r / (r + tolerance)).acos()
    } else if tolerance >= r {
        PI
    } else {
        2.0 * (1.0 - tolerance / r).acos()
    };
    let max_step = max_step.clamp(1e-6, FRAC_PI_2);
    let count = ((alpha.abs() / max_step).ceil() as usize).clamp(1, MAX_ARC_SEGMENTS);
    let step = alpha / count as f64;
    let a0 = (start.1 - cy).atan2(start.0 - cx);
    if circumscribe {
        // Chords tangent to the arc at the endpoints and every step between
        let rr = r / (step / 2.0).cos();
        for k in 0..count {
            let a = a0 + (k as f64 + 0.5) * step;
            ring.push((
                snap_away(cx + rr * a.cos(), cx),
                snap_away(cy + rr * a.sin(), cy),
            ));
        }
    } else {
        for k in 1..count {
            let a = a0 + k as f64 * step;
            ring.push((
                snap_toward(cx + r * a.cos(), cx),
                snap_toward(cy + r * a.sin(), cy),
            ));
        }
    }
}

/// Round onto the grid, away from `center`
fn snap_away(v: f64, center: f64) -> f64 {
    if v > center {
        (v - SNAP_EPSILON).ceil()
    } else if v < center {
        (v + SNAP_EPSILON).floor()
    } else {
        v.round()
    }
}

/// Round onto the grid, toward `center`
fn snap_toward(v: f64, center: f64) -> f64 {
    if v > center {
        (v + SNAP_EPSILON).floor()
    } else if v < center {
        (v - SNAP_EPSILON).ceil()
    } else {
        v.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_radius(ring: &[(f64, f64)]) -> f64 {
        ring.iter().map(|p| p.0.hypot(p.1)).fold(0.0, f64::max)
    }

    fn min_radius(ring: &[(f64, f64)]) -> f64 {
        ring.iter().map(|p| p.0.hypot(p.1)).fold(f64::MAX, f64::min)
    }

    #[test]
    fn test_circle_is_counter_clockwise() {
        let circle = Path::circle(Length::from_nm(2000));
        let expected = PI * 1000.0 * 1000.0;
        assert!((circle.signed_area() - expected).abs() < 1.0);
        assert!(circle.reversed().signed_area() < 0.0);
    }

    #[test]
    fn test_outward_flattening_stays_outside() {
        let d = Length::from_mm(1.0);
        let tol = Length::from_nm(5000);
        let ring = Path::circle(d).flatten(tol, FlattenMode::Outward);
        let r = 500_000.0;
        assert!(ring.len() >= 8);
        // Vertices sit outside the circle, but never further than tolerance
        assert!(min_radius(&ring) >= r);
        assert!(max_radius(&ring) <= r + 5000.0 + 2.0);
        for p in &ring {
            assert_eq!(p.0, p.0.round());
            assert_eq!(p.1, p.1.round());
        }
    }

    #[test]
    fn test_inward_flattening_stays_inside() {
        let ring = Path::circle(Length::from_mm(1.0)).flatten(Length::from_nm(5000), FlattenMode::Inward);
        assert!(max_radius(&ring) <= 500_000.0);
        assert!(min_radius(&ring) >= 500_000.0 - 5000.0 - 2.0);
    }

    #[test]
    fn test_obround_caps_keep_straight_edges() {
        let p = Path::obround(Point::from_nm(0, 0), Point::from_nm(1_000_000, 0), Length::from_nm(200_000));
        let ring = p.flatten(Length::from_nm(5000), FlattenMode::Outward);
        let max_y = ring.iter().map(|p| p.1).fold(f64::MIN, f64::max);
        let min_y = ring.iter().map(|p| p.1).fold(f64::MAX, f64::min);
        assert_eq!(max_y, 100_000.0);
        assert_eq!(min_y, -100_000.0);
    }

    #[test]
    fn test_diagonal_obround_sides_never_move_inward() {
        let width = Length::from_nm(300_001);
        let obround = Path::obround(Point::from_nm(0, 0), Point::from_nm(1_000_003, 700_001), width);
        let (dx, dy) = (1_000_003i128, 700_001i128);
        let len2 = dx * dx + dy * dy;
        let w = width.nm() as i128;
        for (i, v) in obround.vertices()[..4].iter().enumerate() {
            let (x, y) = (v.pos.x.nm() as i128, v.pos.y.nm() as i128);
            // Vertices 0 and 3 belong to p1, 1 and 2 to p2
            let (ox, oy) = if i == 0 || i == 3 { (0, 0) } else { (dx, dy) };
            // (2 * distance to the centerline)^2 >= width^2, in exact integers
            let cross = dx * (y - oy) - dy * (x - ox);
            assert!(4 * cross * cross >= w * w * len2, "{:?} moved inward", v.pos);
        }
        // Caps stay centered on the endpoints
        let a = obround.vertices()[0].pos;
        let d = obround.vertices()[3].pos;
        assert_eq!(a.x.nm() + d.x.nm(), 0);
        assert_eq!(a.y.nm() + d.y.nm(), 0);
    }

    #[test]
    fn test_outline_strokes_per_segment() {
        let path = Path::from_points([
            Point::from_nm(0, 0),
            Point::from_nm(1000, 0),
            Point::from_nm(1000, 1000),
        ]);
        assert_eq!(path.to_outline_strokes(Length::from_nm(100)).len(), 2);
        let dot = Path::from_points([Point::from_nm(5, 5)]);
        let strokes = dot.to_outline_strokes(Length::from_nm(100));
        assert_eq!(strokes, vec![Path::circle_at(Point::from_nm(5, 5), Length::from_nm(100))]);
    }

    #[test]
    fn test_arc_obround_area() {
        // Half ring: radius 10000, width 2000 -> area of the band plus two caps
        let p = Path::arc_obround(
            Point::from_nm(10_000, 0),
            Point::from_nm(-10_000, 0),
            Angle::DEG180,
            Length::from_nm(2000),
        );
        let band = PI / 2.0 * (11_000.0f64.powi(2) - 9_000.0f64.powi(2));
        let caps = PI * 1000.0 * 1000.0;
        assert!((p.signed_area().abs() - (band + caps)).abs() < 100.0);
    }

    #[test]
    fn test_reversed_keeps_arcs() {
        let path = Path::line(Point::from_nm(0, 0), Point::from_nm(10, 0), Angle::DEG90);
        let rev = path.reversed();
        assert_eq!(rev.vertices()[0].pos, Point::from_nm(10, 0));
        assert_eq!(rev.vertices()[0].angle, -Angle::DEG90);
        assert!(rev.is_curved());
    }
}
