//! Conversion of board items into polygon sets
//!
//! [`PathGenerator`] turns the geometry of one layer (optionally restricted
//! to some nets) into a [`PolygonSet`]. Copper and keep-out shapes are
//! flattened outward so no violation hides behind an arc approximation.

use super::algebra::PolygonSet;
use crate::board::{
    is_copper_layer, Board, Device, Hole, NetSignalId, PlaneFills, BOARD_OUTLINES, BOT_STOP_MASK, TOP_STOP_MASK,
};
use crate::error::Result;
use crate::geometry::{FlattenMode, Length, Path, Transform};
use std::collections::BTreeSet;

/// Which nets contribute copper. `None` inside a set stands for copper that
/// is not connected to any net.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NetFilter {
    All,
    Nets(BTreeSet<Option<NetSignalId>>),
}

impl NetFilter {
    pub fn single(net: Option<&NetSignalId>) -> Self {
        NetFilter::Nets(std::iter::once(net.cloned()).collect())
    }

    pub fn matches(&self, net: Option<&NetSignalId>) -> bool {
        match self {
            NetFilter::All => true,
            NetFilter::Nets(nets) => nets.contains(&net.cloned()),
        }
    }
}

/// Collects paths for one polygon set; filled areas with cutouts are kept
/// apart because they combine with the even-odd rule
#[derive(Default)]
struct Builder {
    areas: Vec<Path>,
    even_odd: Vec<Vec<Path>>,
}

impl Builder {
    fn finish(self, tolerance: Length, mode: FlattenMode) -> Result<PolygonSet> {
        let mut sets = vec![PolygonSet::from_paths(&self.areas, tolerance, mode)?];
        for rings in &self.even_odd {
            sets.push(PolygonSet::from_even_odd(rings, tolerance, mode)?);
        }
        PolygonSet::unite_all(sets)
    }
}

pub struct PathGenerator<'a> {
    board: &'a Board,
    tolerance: Length,
    plane_fills: Option<&'a PlaneFills>,
}

impl<'a> PathGenerator<'a> {
    pub fn new(board: &'a Board, tolerance: Length) -> Self {
        Self {
            board,
            tolerance,
            plane_fills: None,
        }
    }

    /// Use freshly rebuilt plane fills instead of the snapshot's fragments
    pub fn with_plane_fills(mut self, fills: &'a PlaneFills) -> Self {
        self.plane_fills = Some(fills);
        self
    }

    pub fn tolerance(&self) -> Length {
        self.tolerance
    }

    /// Board area: outline rings with cutouts, flattened inward
    pub fn board_outline(&self) -> Result<PolygonSet> {
        let mut rings: Vec<Path> = self
            .board
            .polygons
            .iter()
            .filter(|p| p.layer == BOARD_OUTLINES)
            .map(|p| p.path.closed())
            .collect();
        for device in &self.board.devices {
            let transform = device.transform();
            rings.extend(
                device
                    .footprint
                    .polygons
                    .iter()
                    .filter(|p| transform.map_layer(&p.layer) == BOARD_OUTLINES)
                    .map(|p| transform.map_path(&p.path.closed())),
            );
        }
        PolygonSet::from_even_odd(&rings, self.tolerance, FlattenMode::Inward)
    }

    /// Non-plated holes of the board and of device packages, each grown by
    /// `expansion` on every side
    pub fn holes(&self, expansion: Length) -> Result<PolygonSet> {
        let mut builder = Builder::default();
        let mut add = |hole: &Hole, transform: &Transform| {
            let width = hole.diameter + expansion * 2;
            if width > Length::ZERO {
                builder
                    .areas
                    .extend(transform.map_paths(&hole.path.to_outline_strokes(width)));
            }
        };
        for hole in &self.board.holes {
            add(hole, &Transform::IDENTITY);
        }
        for device in &self.board.devices {
            let transform = device.transform();
            for hole in &device.footprint.holes {
                add(hole, &transform);
            }
        }
        builder.finish(self.tolerance, FlattenMode::Outward)
    }

    /// Drilled area of one hole
    pub fn hole_outline(&self, hole: &Hole, transform: &Transform) -> Result<PolygonSet> {
        PolygonSet::from_paths(&hole.outlines(transform), self.tolerance, FlattenMode::Outward)
    }

    /// All copper on `layer` belonging to the nets accepted by `filter`
    pub fn copper(&self, layer: &str, filter: &NetFilter) -> Result<PolygonSet> {
        let mut builder = Builder::default();
        if !is_copper_layer(layer) {
            return Ok(PolygonSet::new());
        }

        for segment in &self.board.net_segments {
            if !filter.matches(segment.net.as_ref()) {
                continue;
            }
            builder
                .areas
                .extend(segment.vias.iter().filter_map(|via| via.outline(Length::ZERO)));
            builder.areas.extend(
                segment
                    .lines
                    .iter()
                    .filter(|line| line.layer == layer)
                    .map(|line| line.outline(line.width)),
            );
        }

        for (index, plane) in self.board.planes.iter().enumerate() {
            if plane.layer != layer || !filter.matches(Some(&plane.net)) {
                continue;
            }
            let fragments = match self.plane_fills {
                Some(fills) => fills.get(index).map(Vec::as_slice).unwrap_or_default(),
                None => plane.fragments.as_slice(),
            };
            if !fragments.is_empty() {
                builder.even_odd.push(fragments.to_vec());
            }
        }

        for device in &self.board.devices {
            for pad in &device.footprint.pads {
                if !filter.matches(pad.net.as_ref()) {
                    continue;
                }
                let outlines = pad.outlines_on_layer(layer, device.mirrored, &self.board.rules, Length::ZERO);
                builder
                    .areas
                    .extend(outlines.iter().map(|path| device.pad_to_board(pad, path)));
            }
        }

        // Graphics never belong to a net
        if filter.matches(None) {
            self.add_graphics(layer, &mut builder);
        }

        builder.finish(self.tolerance, FlattenMode::Outward)
    }

    /// Courtyard area of one device on a (board side) courtyard layer
    pub fn device_courtyard(&self, device: &Device, layer: &str) -> Result<PolygonSet> {
        let transform = device.transform();
        let mut builder = Builder::default();
        for polygon in &device.footprint.polygons {
            if transform.map_layer(&polygon.layer) == layer {
                builder.areas.push(transform.map_path(&polygon.path.closed()));
            }
        }
        for circle in &device.footprint.circles {
            if transform.map_layer(&circle.layer) == layer {
                let diameter = circle.diameter + circle.line_width;
                builder
                    .areas
                    .push(transform.map_path(&Path::circle_at(circle.center, diameter)));
            }
        }
        builder.finish(self.tolerance, FlattenMode::Outward)
    }

    /// Stop mask openings: pads, vias that need one, and graphics
    pub fn stop_mask(&self, layer: &str) -> Result<PolygonSet> {
        let mut builder = Builder::default();
        let rules = &self.board.rules;
        if layer == TOP_STOP_MASK || layer == BOT_STOP_MASK {
            for via in self.board.net_segments.iter().flat_map(|s| s.vias.iter()) {
                if rules.does_via_require_stop_mask(via.drill_diameter) {
                    builder
                        .areas
                        .extend(via.outline(rules.calc_stop_mask_clearance(via.size)));
                }
            }
        }
        self.add_pad_openings(layer, &mut builder);
        self.add_graphics(layer, &mut builder);
        builder.finish(self.tolerance, FlattenMode::Outward)
    }

    /// Solder paste openings of pads plus graphics on the paste layer
    pub fn solder_paste(&self, layer: &str) -> Result<PolygonSet> {
        let mut builder = Builder::default();
        self.add_pad_openings(layer, &mut builder);
        self.add_graphics(layer, &mut builder);
        builder.finish(self.tolerance, FlattenMode::Outward)
    }

    fn add_pad_openings(&self, layer: &str, builder: &mut Builder) {
        for device in &self.board.devices {
            for pad in &device.footprint.pads {
                let outlines = pad.outlines_on_layer(layer, device.mirrored, &self.board.rules, Length::ZERO);
                builder
                    .areas
                    .extend(outlines.iter().map(|path| device.pad_to_board(pad, path)));
            }
        }
    }

    /// Polygons, circles and texts of the board and of devices
    fn add_graphics(&self, layer: &str, builder: &mut Builder) {
        for polygon in self.board.polygons.iter().filter(|p| p.layer == layer) {
            add_polygon(builder, &polygon.path, polygon.line_width, polygon.filled, &Transform::IDENTITY);
        }
        for text in self.board.stroke_texts.iter().filter(|t| t.layer == layer) {
            builder.areas.extend(text.outlines(text.stroke_width));
        }
        for device in &self.board.devices {
            let transform = device.transform();
            for polygon in &device.footprint.polygons {
                if transform.map_layer(&polygon.layer) == layer {
                    add_polygon(builder, &polygon.path, polygon.line_width, polygon.filled, &transform);
                }
            }
            for circle in &device.footprint.circles {
                if transform.map_layer(&circle.layer) != layer {
                    continue;
                }
                let center = transform.map(circle.center);
                if circle.filled {
                    builder
                        .areas
                        .push(Path::circle_at(center, circle.diameter + circle.line_width));
                } else if circle.line_width > Length::ZERO {
                    let outer = Path::circle_at(center, circle.diameter + circle.line_width);
                    let inner_diameter = circle.diameter - circle.line_width;
                    let mut rings = vec![outer];
                    if inner_diameter > Length::ZERO {
                        rings.push(Path::circle_at(center, inner_diameter));
                    }
                    builder.even_odd.push(rings);
                }
            }
            for text in device.stroke_texts.iter().filter(|t| t.layer == layer) {
                builder.areas.extend(text.outlines(text.stroke_width));
            }
        }
    }
}

fn add_polygon(builder: &mut Builder, path: &Path, line_width: Length, filled: bool, transform: &Transform) {
    let path = transform.map_path(path);
    if filled {
        builder.areas.push(path.closed());
    }
    if line_width > Length::ZERO {
        builder.areas.extend(path.to_outline_strokes(line_width));
    }
}
