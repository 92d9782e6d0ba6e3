//! Polygon algebra for the checks
//!
//! [`PolygonSet`] wraps a `geo` multi-polygon whose coordinates always lie on
//! the integer nanometer grid. Boolean operations go through `geo`'s
//! `BooleanOps`; the result is snapped back onto the grid and rounding
//! slivers below [`MIN_REGION_AREA`] are dropped.
//!
//! Offsetting goes through `cavalier_contours`: every outline and every hole
//! is offset as one closed polyline, and the round corners it produces are
//! flattened back onto the grid before the pieces are combined with `geo`.

use super::distance::ring_contains;
use crate::error::{DrcError, Result};
use crate::geometry::{Angle, FlattenMode, Length, Path, Point, Vertex};
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use geo::{Area, BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Regions smaller than this (in nm²) are rounding artifacts
pub const MIN_REGION_AREA: f64 = 1.0;

/// Coordinates beyond one meter are rejected so exact distance math fits i128
pub const MAX_COORDINATE: f64 = 1e9;

/// A closed ring of grid points (the first point is not repeated)
pub type Contour = Vec<Point>;

/// One outer contour and the holes directly inside it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub outline: Contour,
    pub holes: Vec<Contour>,
}

impl Region {
    /// Outline followed by its holes, each as a closed path
    pub fn to_paths(&self) -> Vec<Path> {
        std::iter::once(&self.outline)
            .chain(self.holes.iter())
            .map(contour_to_path)
            .collect()
    }
}

/// Result representation: a plain even-odd contour list, or a tree that
/// keeps track of which holes belong to which outline
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Regions {
    Flat(Vec<Contour>),
    Nested(Vec<Region>),
}

impl Regions {
    /// Drop the nesting; holes follow their outline
    pub fn flatten(self) -> Vec<Contour> {
        match self {
            Regions::Flat(contours) => contours,
            Regions::Nested(regions) => regions
                .into_iter()
                .flat_map(|r| std::iter::once(r.outline).chain(r.holes))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Regions::Flat(c) => c.is_empty(),
            Regions::Nested(r) => r.is_empty(),
        }
    }
}

pub fn contour_to_path(contour: &Contour) -> Path {
    let mut points = contour.clone();
    if let Some(first) = contour.first() {
        points.push(*first);
    }
    Path::from_points(points)
}

/// Filled area on one layer
#[derive(Clone, Debug)]
pub struct PolygonSet {
    polygons: MultiPolygon<f64>,
}

impl Default for PolygonSet {
    fn default() -> Self {
        Self {
            polygons: MultiPolygon::new(Vec::new()),
        }
    }
}

impl PolygonSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_multi(polygons: MultiPolygon<f64>) -> Result<Self> {
        Ok(Self {
            polygons: snapped(polygons)?,
        })
    }

    /// Area enclosed by one closed path
    pub fn from_path(path: &Path, tolerance: Length, mode: FlattenMode) -> Result<Self> {
        let ring = path.flatten(tolerance, mode);
        if ring.len() < 3 {
            return Ok(Self::new());
        }
        let exterior = LineString::from(ring);
        Self::from_multi(MultiPolygon::new(vec![Polygon::new(exterior, vec![])]))
    }

    /// Union of the areas of several closed paths
    pub fn from_paths(paths: &[Path], tolerance: Length, mode: FlattenMode) -> Result<Self> {
        let sets = paths
            .iter()
            .map(|p| Self::from_path(p, tolerance, mode))
            .collect::<Result<Vec<_>>>()?;
        Self::unite_all(sets)
    }

    /// Area of rings combined with the even-odd rule (outline with cutouts).
    ///
    /// Rings nested at odd depth are holes and get flattened with the
    /// opposite mode, so the filled area still moves in the `mode` direction.
    pub fn from_even_odd(paths: &[Path], tolerance: Length, mode: FlattenMode) -> Result<Self> {
        let rings: Vec<Vec<[i64; 2]>> = paths
            .iter()
            .map(|p| p.flatten(tolerance, mode).into_iter().map(grid_point).collect())
            .collect();
        let mut sets = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            let Some(first) = path.vertices().first() else {
                continue;
            };
            let start = [first.pos.x.nm(), first.pos.y.nm()];
            let depth = rings
                .iter()
                .enumerate()
                .filter(|(j, ring)| *j != i && ring_contains(ring, start))
                .count();
            let ring_mode = if depth % 2 == 0 { mode } else { mode.inverted() };
            sets.push(Self::from_path(path, tolerance, ring_mode)?);
        }
        reduce_balanced(sets, |a, b| a.xor(&b))
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.polygons.unsigned_area()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.0.len()
    }

    /// `[min_x, min_y, max_x, max_y]` in nanometers
    pub fn bounds(&self) -> Option<[i64; 4]> {
        self.polygons.bounding_rect().map(|r| {
            [
                r.min().x as i64,
                r.min().y as i64,
                r.max().x as i64,
                r.max().y as i64,
            ]
        })
    }

    /// Every ring of every polygon as grid points
    pub fn rings(&self) -> Vec<Vec<[i64; 2]>> {
        self.polygons
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
            .map(|ring| ring.coords().map(|c| grid_point((c.x, c.y))).collect())
            .collect()
    }

    /// First vertex of every outer contour
    pub fn outline_vertices(&self) -> Vec<[i64; 2]> {
        self.polygons
            .iter()
            .filter_map(|p| p.exterior().coords().next().map(|c| grid_point((c.x, c.y))))
            .collect()
    }

    /// Even-odd point containment over all rings
    pub fn contains(&self, point: [i64; 2]) -> bool {
        self.rings()
            .iter()
            .filter(|ring| ring_contains(ring, point))
            .count()
            % 2
            == 1
    }

    pub fn union(&self, other: &PolygonSet) -> Result<Self> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        Self::from_multi(guarded("union", || self.polygons.union(&other.polygons))?)
    }

    pub fn intersect(&self, other: &PolygonSet) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::new());
        }
        Self::from_multi(guarded("intersection", || self.polygons.intersection(&other.polygons))?)
    }

    pub fn subtract(&self, other: &PolygonSet) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Ok(self.clone());
        }
        Self::from_multi(guarded("difference", || self.polygons.difference(&other.polygons))?)
    }

    fn xor(&self, other: &PolygonSet) -> Result<Self> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        Self::from_multi(guarded("xor", || self.polygons.xor(&other.polygons))?)
    }

    /// Union of many sets, merged pairwise so intermediate results stay small
    pub fn unite_all(sets: Vec<PolygonSet>) -> Result<Self> {
        reduce_balanced(sets, |a, b| a.union(&b))
    }

    /// Area covered by every set; empty for an empty list
    pub fn intersect_all(sets: &[PolygonSet]) -> Result<Self> {
        let Some((first, rest)) = sets.split_first() else {
            return Ok(Self::new());
        };
        let mut acc = first.clone();
        for set in rest {
            if acc.is_empty() {
                break;
            }
            acc = acc.intersect(set)?;
        }
        Ok(acc)
    }

    /// Grow (positive) or shrink (negative) by `distance`.
    ///
    /// New round corners are flattened within `tolerance` so that a grown
    /// set covers at least the true offset and a shrunk one at most.
    pub fn offset(&self, distance: Length, tolerance: Length) -> Result<Self> {
        if distance.is_zero() || self.is_empty() {
            return Ok(self.clone());
        }
        let mode = if distance > Length::ZERO {
            FlattenMode::Outward
        } else {
            FlattenMode::Inward
        };
        let d = distance.nm() as f64;
        let mut parts = Vec::with_capacity(self.polygons.0.len());
        for polygon in self.polygons.iter() {
            let outline = offset_ring(polygon.exterior(), d, tolerance, mode)?;
            // Holes move the other way: growing the copper shrinks its cutouts
            let holes = polygon
                .interiors()
                .iter()
                .map(|ring| offset_ring(ring, -d, tolerance, mode.inverted()))
                .collect::<Result<Vec<_>>>()?;
            parts.push(outline.subtract(&Self::unite_all(holes)?)?);
        }
        Self::unite_all(parts)
    }

    /// Each outer contour with the holes inside it
    pub fn regions(&self) -> Vec<Region> {
        self.polygons
            .iter()
            .map(|p| Region {
                outline: contour(p.exterior()),
                holes: p.interiors().iter().map(contour).collect(),
            })
            .collect()
    }

    /// Nested representation
    pub fn tree(&self) -> Regions {
        Regions::Nested(self.regions())
    }

    /// Flat even-odd contour list
    pub fn flat(&self) -> Regions {
        Regions::Flat(self.tree().flatten())
    }

    /// All contours as closed paths (even-odd)
    pub fn to_paths(&self) -> Vec<Path> {
        self.flat().flatten().iter().map(contour_to_path).collect()
    }
}

fn reduce_balanced<F>(sets: Vec<PolygonSet>, op: F) -> Result<PolygonSet>
where
    F: Fn(PolygonSet, PolygonSet) -> Result<PolygonSet>,
{
    let mut level = sets;
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        let mut iter = level.into_iter();
        while let Some(a) = iter.next() {
            next.push(match iter.next() {
                Some(b) => op(a, b)?,
                None => a,
            });
        }
        level = next;
    }
    Ok(level.pop().unwrap_or_default())
}

/// Run a backend operation, turning a panic into a geometry failure
fn guarded<T>(what: &str, op: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(op)).map_err(|_| DrcError::geometry(format!("polygon {} failed", what)))
}

/// Area enclosed by one ring after moving its boundary outward by `distance`
/// (inward when negative). Clockwise result loops enclose voids.
fn offset_ring(ring: &LineString<f64>, distance: f64, tolerance: Length, mode: FlattenMode) -> Result<PolygonSet> {
    let mut points: Vec<[i64; 2]> = ring.coords().map(|c| grid_point((c.x, c.y))).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Ok(PolygonSet::new());
    }
    if twice_signed_area(&points) < 0 {
        points.reverse();
    }
    let mut pline = Polyline::new();
    for p in &points {
        pline.add_vertex(PlineVertex::new(p[0] as f64, p[1] as f64, 0.0));
    }
    pline.set_is_closed(true);

    // Positive offsets move a counter-clockwise polyline to its left, inward
    let loops = guarded("offset", || pline.parallel_offset(-distance))?;
    let mut filled = Vec::new();
    let mut voids = Vec::new();
    for result in &loops {
        let path = polyline_to_path(result);
        if path.signed_area() >= 0.0 {
            filled.push(PolygonSet::from_path(&path, tolerance, mode)?);
        } else {
            voids.push(PolygonSet::from_path(&path.reversed(), tolerance, mode.inverted())?);
        }
    }
    PolygonSet::unite_all(filled)?.subtract(&PolygonSet::unite_all(voids)?)
}

/// Closed path of a polyline; a bulge is `tan(angle / 4)` of its arc
fn polyline_to_path(pline: &Polyline<f64>) -> Path {
    let mut vertices: Vec<Vertex> = (0..pline.vertex_count())
        .map(|i| {
            let v = pline.at(i);
            let angle = Angle::from_deg((4.0 * v.bulge.atan()).to_degrees());
            Vertex::new(Point::from_f64(v.x, v.y), angle)
        })
        .collect();
    if let Some(first) = vertices.first() {
        let start = first.pos;
        vertices.push(Vertex::straight(start));
    }
    Path::new(vertices)
}

fn twice_signed_area(ring: &[[i64; 2]]) -> i128 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            a[0] as i128 * b[1] as i128 - b[0] as i128 * a[1] as i128
        })
        .sum()
}

fn grid_point(p: (f64, f64)) -> [i64; 2] {
    [p.0.round() as i64, p.1.round() as i64]
}

fn contour(ring: &LineString<f64>) -> Contour {
    let mut points: Vec<Point> = ring.coords().map(|c| Point::from_f64(c.x, c.y)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn snapped(polygons: MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
    let mut result = Vec::with_capacity(polygons.0.len());
    for polygon in polygons {
        let (exterior, interiors) = polygon.into_inner();
        let Some(exterior) = snap_ring(exterior)? else {
            continue;
        };
        let mut holes = Vec::with_capacity(interiors.len());
        for ring in interiors {
            if let Some(ring) = snap_ring(ring)? {
                holes.push(ring);
            }
        }
        let polygon = Polygon::new(exterior, holes);
        if polygon.unsigned_area() >= MIN_REGION_AREA {
            result.push(polygon);
        }
    }
    Ok(MultiPolygon::new(result))
}

fn snap_ring(ring: LineString<f64>) -> Result<Option<LineString<f64>>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in ring.0 {
        if !c.x.is_finite() || !c.y.is_finite() || c.x.abs() > MAX_COORDINATE || c.y.abs() > MAX_COORDINATE {
            return Err(DrcError::geometry(format!("coordinate out of range: ({}, {})", c.x, c.y)));
        }
        let c = Coord {
            x: c.x.round(),
            y: c.y.round(),
        };
        if coords.last() != Some(&c) {
            coords.push(c);
        }
    }
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return Ok(None);
    }
    Ok(Some(LineString::new(coords)))
}
