//! Distance calculation algorithms for DRC
//!
//! Pass/fail decisions use exact integer predicates on grid coordinates
//! (`i128` intermediates, no square roots). The floating point helpers are
//! only used to place a marker at the closest approach.

use super::algebra::PolygonSet;
use crate::geometry::Length;
use rstar::{RTree, RTreeObject, AABB};

/// Polygon edge on the nanometer grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub a: [i64; 2],
    pub b: [i64; 2],
}

impl Segment {
    pub fn new(a: [i64; 2], b: [i64; 2]) -> Self {
        Self { a, b }
    }

    /// Bounding box grown by `margin` on every side
    pub fn expanded_envelope(&self, margin: i64) -> AABB<[i64; 2]> {
        AABB::from_corners(
            [self.a[0].min(self.b[0]) - margin, self.a[1].min(self.b[1]) - margin],
            [self.a[0].max(self.b[0]) + margin, self.a[1].max(self.b[1]) + margin],
        )
    }
}

impl RTreeObject for Segment {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

/// All boundary edges of a polygon set
pub fn segments(set: &PolygonSet) -> Vec<Segment> {
    set.rings()
        .iter()
        .flat_map(|ring| ring.windows(2).map(|w| Segment::new(w[0], w[1])))
        .collect()
}

fn cross(o: [i64; 2], a: [i64; 2], b: [i64; 2]) -> i128 {
    let (ax, ay) = ((a[0] - o[0]) as i128, (a[1] - o[1]) as i128);
    let (bx, by) = ((b[0] - o[0]) as i128, (b[1] - o[1]) as i128);
    ax * by - ay * bx
}

fn on_segment(p: [i64; 2], s: &Segment) -> bool {
    p[0] >= s.a[0].min(s.b[0]) && p[0] <= s.a[0].max(s.b[0]) && p[1] >= s.a[1].min(s.b[1]) && p[1] <= s.a[1].max(s.b[1])
}

/// Do two closed segments share at least one point?
pub fn segments_intersect(s: &Segment, t: &Segment) -> bool {
    let d1 = cross(t.a, t.b, s.a);
    let d2 = cross(t.a, t.b, s.b);
    let d3 = cross(s.a, s.b, t.a);
    let d4 = cross(s.a, s.b, t.b);
    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0)) {
        return true;
    }
    (d1 == 0 && on_segment(s.a, t))
        || (d2 == 0 && on_segment(s.b, t))
        || (d3 == 0 && on_segment(t.a, s))
        || (d4 == 0 && on_segment(t.b, s))
}

/// Is point `p` strictly closer than `clearance` to segment `s`?
pub fn point_segment_within(p: [i64; 2], s: &Segment, clearance: i64) -> bool {
    let c2 = (clearance as i128) * (clearance as i128);
    let (vx, vy) = ((s.b[0] - s.a[0]) as i128, (s.b[1] - s.a[1]) as i128);
    let (wx, wy) = ((p[0] - s.a[0]) as i128, (p[1] - s.a[1]) as i128);
    let vv = vx * vx + vy * vy;
    let t = wx * vx + wy * vy;
    if vv == 0 || t <= 0 {
        return wx * wx + wy * wy < c2;
    }
    if t >= vv {
        let (ux, uy) = ((p[0] - s.b[0]) as i128, (p[1] - s.b[1]) as i128);
        return ux * ux + uy * uy < c2;
    }
    // Perpendicular foot lies inside the segment
    let cr = vx * wy - vy * wx;
    cr * cr < c2 * vv
}

/// Is the distance between two segments strictly below `clearance`?
pub fn segments_within(s: &Segment, t: &Segment, clearance: i64) -> bool {
    segments_intersect(s, t)
        || point_segment_within(s.a, t, clearance)
        || point_segment_within(s.b, t, clearance)
        || point_segment_within(t.a, s, clearance)
        || point_segment_within(t.b, s, clearance)
}

/// Crossing-number test of a point against one closed ring
pub fn ring_contains(ring: &[[i64; 2]], p: [i64; 2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[j], ring[i]);
        if (a[1] > p[1]) != (b[1] > p[1]) {
            // x of the crossing compared with p.x, multiplied out by (b.y - a.y)
            let lhs = (p[0] - a[0]) as i128 * (b[1] - a[1]) as i128;
            let rhs = (p[1] - a[1]) as i128 * (b[0] - a[0]) as i128;
            let left_of_crossing = if b[1] > a[1] { lhs < rhs } else { lhs > rhs };
            if left_of_crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closest approach of two areas if they come closer than `clearance`.
///
/// Edges of `b` go into an R-tree; each edge of `a` queries it with its box
/// expanded by the clearance. Areas that contain one another without any
/// edge pair nearby are caught by a containment test.
pub fn sets_within(a: &PolygonSet, b: &PolygonSet, clearance: Length) -> Option<[f64; 2]> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let c = clearance.nm().max(0);
    let (Some(ba), Some(bb)) = (a.bounds(), b.bounds()) else {
        return None;
    };
    if ba[0] - c > bb[2] || bb[0] - c > ba[2] || ba[1] - c > bb[3] || bb[1] - c > ba[3] {
        return None;
    }

    let edges_b = RTree::bulk_load(segments(b));
    let mut best: Option<(f64, [f64; 2])> = None;
    for s in segments(a) {
        for t in edges_b.locate_in_envelope_intersecting(&s.expanded_envelope(c)) {
            let hit = if c == 0 {
                segments_intersect(&s, t)
            } else {
                segments_within(&s, t, c)
            };
            if hit {
                let (d, p) = segment_distance(to_f64(s.a), to_f64(s.b), to_f64(t.a), to_f64(t.b));
                if best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, p));
                }
            }
        }
    }
    if let Some((_, p)) = best {
        return Some(p);
    }

    // No boundaries nearby: every island of either area is now completely
    // inside or completely outside the other one
    first_inside(a.outline_vertices(), b)
        .or_else(|| first_inside(b.outline_vertices(), a))
        .map(to_f64)
}

/// First of `points` covered by `area` (even-odd)
fn first_inside(points: Vec<[i64; 2]>, area: &PolygonSet) -> Option<[i64; 2]> {
    let rings = area.rings();
    points
        .into_iter()
        .find(|&p| rings.iter().filter(|ring| ring_contains(ring, p)).count() % 2 == 1)
}

fn to_f64(p: [i64; 2]) -> [f64; 2] {
    [p[0] as f64, p[1] as f64]
}

/// Segment-to-segment minimum distance
pub fn segment_distance(a1: [f64; 2], a2: [f64; 2], b1: [f64; 2], b2: [f64; 2]) -> (f64, [f64; 2]) {
    let mut min_d = f64::MAX;
    let mut closest = [0.0f64; 2];

    for (p, s1, s2) in [(a1, b1, b2), (a2, b1, b2), (b1, a1, a2), (b2, a1, a2)] {
        let (d, q) = point_segment_distance(p, s1, s2);
        if d < min_d {
            min_d = d;
            closest = midpoint(p, q);
        }
    }

    (min_d, closest)
}

/// Point-to-segment minimum distance
pub fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> (f64, [f64; 2]) {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 < 1e-10 {
        // Degenerate segment
        let d = ((p[0] - a[0]).powi(2) + (p[1] - a[1]).powi(2)).sqrt();
        return (d, a);
    }

    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / ab_len2).clamp(0.0, 1.0);
    let closest = [a[0] + t * ab[0], a[1] + t * ab[1]];
    let d = ((p[0] - closest[0]).powi(2) + (p[1] - closest[1]).powi(2)).sqrt();

    (d, closest)
}

/// Midpoint of two points
pub fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}
