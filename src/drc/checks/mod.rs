//! Check passes and the state they share during one run
//!
//! # Submodules
//! - `clearance` - Board outline, copper-copper and courtyard clearances
//! - `width` - Minimum copper width of texts, planes and traces
//! - `annular` - Minimum PTH annular rings
//! - `drills` - Drill diameters, slot widths and slot shape advisories
//! - `connections` - Plane rebuild and missing connections

pub(crate) mod annular;
pub(crate) mod clearance;
pub(crate) mod connections;
pub(crate) mod drills;
pub(crate) mod width;

use super::algebra::PolygonSet;
use super::listener::DrcListener;
use super::paths::{NetFilter, PathGenerator};
use super::types::{DrcEvent, DrcReport, Violation};
use crate::board::{Board, NetSignalId, PlaneFills};
use crate::error::Result;
use crate::geometry::Length;
use crate::rules::CheckOptions;
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;

/// Smallest stroke used to draw a violation location
pub(crate) const MIN_LOCATION_WIDTH: Length = Length::from_nm(50_000);

pub(crate) type CacheKey = (String, NetFilter);

/// Progress range owned by one pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: u8,
    pub end: u8,
}

impl Span {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Percentage after `done` of `total` work items
    pub fn at(self, done: usize, total: usize) -> u8 {
        if total == 0 {
            return self.end;
        }
        let width = (self.end - self.start) as usize;
        self.start + (width * done.min(total) / total) as u8
    }
}

/// Everything a pass reads or writes during one run
pub(crate) struct RunContext<'a, 'l> {
    pub board: &'a Board,
    pub options: &'a CheckOptions,
    plane_fills: Option<PlaneFills>,
    cache: &'a mut HashMap<CacheKey, PolygonSet>,
    listener: &'l mut dyn DrcListener,
    violations: Vec<Violation>,
    status: Vec<String>,
    progress: u8,
}

impl<'a, 'l> RunContext<'a, 'l> {
    pub fn new(
        board: &'a Board,
        options: &'a CheckOptions,
        cache: &'a mut HashMap<CacheKey, PolygonSet>,
        listener: &'l mut dyn DrcListener,
    ) -> Self {
        Self {
            board,
            options,
            plane_fills: None,
            cache,
            listener,
            violations: Vec::new(),
            status: Vec::new(),
            progress: 0,
        }
    }

    pub fn tolerance(&self) -> Length {
        self.options.max_arc_tolerance
    }

    pub fn generator(&self) -> PathGenerator<'_> {
        let generator = PathGenerator::new(self.board, self.tolerance());
        match &self.plane_fills {
            Some(fills) => generator.with_plane_fills(fills),
            None => generator,
        }
    }

    /// Replace the plane fills; cached copper is stale afterwards
    pub fn set_plane_fills(&mut self, fills: PlaneFills) {
        self.plane_fills = Some(fills);
        self.cache.clear();
    }

    /// Copper of a layer for some nets, computed once per run
    pub fn copper(&mut self, layer: &str, filter: &NetFilter) -> Result<PolygonSet> {
        let key = (layer.to_string(), filter.clone());
        if let Some(set) = self.cache.get(&key) {
            return Ok(set.clone());
        }
        let set = self.generator().copper(layer, filter)?;
        self.cache.insert(key, set.clone());
        Ok(set)
    }

    /// Enabled copper layers in stack order
    pub fn copper_layers(&self) -> Vec<String> {
        self.board
            .layers
            .enabled_copper_layers()
            .into_iter()
            .map(|l| l.name.clone())
            .collect()
    }

    pub fn is_enabled_copper_layer(&self, name: &str) -> bool {
        self.board
            .layers
            .get(name)
            .is_some_and(|l| l.copper && l.enabled)
    }

    /// All nets followed by unconnected copper
    pub fn nets(&self) -> Vec<Option<NetSignalId>> {
        self.board
            .nets_with_unconnected()
            .into_iter()
            .map(|n| n.cloned())
            .collect()
    }

    pub fn layer_name(&self, layer: &str) -> String {
        self.board.layers.display_name(layer).to_string()
    }

    pub fn net_name(&self, net: Option<&NetSignalId>) -> &'a str {
        let board: &'a Board = self.board;
        board.net_name(net)
    }

    pub fn emit(&mut self, event: DrcEvent) {
        self.listener.on_event(event);
    }

    pub fn status(&mut self, status: impl Into<String>) {
        let status = status.into();
        self.status.push(status.clone());
        self.emit(DrcEvent::Status(status));
    }

    /// Report progress; values below the last one are raised to it
    pub fn progress(&mut self, percent: u8) {
        self.progress = percent.clamp(self.progress, 100);
        self.emit(DrcEvent::Progress(self.progress));
    }

    pub fn report(&mut self, violation: Violation) {
        self.violations.push(violation.clone());
        self.emit(DrcEvent::Violation(violation));
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn finish(self) -> DrcReport {
        DrcReport {
            violations: self.violations,
            status: self.status,
        }
    }
}

/// Bounding box of one area, for pair pre-filtering
#[derive(Clone, Debug)]
pub(crate) struct AreaBounds {
    pub index: usize,
    pub bounds: AABB<[i64; 2]>,
}

impl RTreeObject for AreaBounds {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// For every area `i`, the areas `k > i` whose boxes come within `margin`.
/// Partners are sorted so pairs are visited in index order.
pub(crate) fn candidate_pairs(areas: &[PolygonSet], margin: Length) -> Vec<Vec<usize>> {
    let margin = margin.nm().max(0);
    let entries: Vec<AreaBounds> = areas
        .iter()
        .enumerate()
        .filter_map(|(index, area)| {
            area.bounds().map(|b| AreaBounds {
                index,
                bounds: AABB::from_corners([b[0], b[1]], [b[2], b[3]]),
            })
        })
        .collect();
    let mut pairs = vec![Vec::new(); areas.len()];
    let tree = RTree::bulk_load(entries.clone());
    for entry in &entries {
        let lower = entry.bounds.lower();
        let upper = entry.bounds.upper();
        let search = AABB::from_corners(
            [lower[0] - margin, lower[1] - margin],
            [upper[0] + margin, upper[1] + margin],
        );
        let mut partners: Vec<usize> = tree
            .locate_in_envelope_intersecting(&search)
            .map(|other| other.index)
            .filter(|&k| k > entry.index)
            .collect();
        partners.sort_unstable();
        pairs[entry.index] = partners;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FlattenMode, Path, Point};

    #[test]
    fn test_span_progress() {
        let span = Span::new(40, 70);
        assert_eq!(span.at(0, 10), 40);
        assert_eq!(span.at(5, 10), 55);
        assert_eq!(span.at(10, 10), 70);
        assert_eq!(span.at(12, 10), 70);
        assert_eq!(span.at(0, 0), 70);
    }

    #[test]
    fn test_candidate_pairs_use_margin() {
        let square = |x: i64| {
            PolygonSet::from_path(
                &Path::rect(Point::from_nm(x, 0), Point::from_nm(x + 1000, 1000)),
                Length::from_nm(10),
                FlattenMode::Outward,
            )
            .unwrap()
        };
        let areas = vec![square(0), square(1500), PolygonSet::new(), square(5000)];
        let pairs = candidate_pairs(&areas, Length::from_nm(500));
        assert_eq!(pairs, vec![vec![1], vec![], vec![], vec![]]);
        let pairs = candidate_pairs(&areas, Length::from_nm(3000));
        assert_eq!(pairs, vec![vec![1], vec![3], vec![], vec![]]);
    }

    #[test]
    fn test_progress_never_decreases() {
        let board = Board::default();
        let options = CheckOptions::default();
        let mut cache = HashMap::new();
        let mut events: Vec<DrcEvent> = Vec::new();
        let mut ctx = RunContext::new(&board, &options, &mut cache, &mut events);
        ctx.progress(40);
        ctx.progress(30);
        ctx.progress(120);
        drop(ctx);
        assert_eq!(
            events,
            vec![DrcEvent::Progress(40), DrcEvent::Progress(40), DrcEvent::Progress(100)]
        );
    }
}
