//! Placed devices, their footprints and pads

use super::items::{CircleShape, Hole, PolygonShape, StrokeText};
use super::layers::{
    is_copper_layer, is_inner_copper_layer, BOT_COPPER, BOT_SOLDER_PASTE, BOT_STOP_MASK, TOP_COPPER,
    TOP_SOLDER_PASTE, TOP_STOP_MASK,
};
use super::NetSignalId;
use crate::geometry::{Angle, Length, Path, Point, Transform};
use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSide {
    #[default]
    Top,
    Bottom,
}

impl ComponentSide {
    pub fn flipped(self) -> Self {
        match self {
            ComponentSide::Top => ComponentSide::Bottom,
            ComponentSide::Bottom => ComponentSide::Top,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadShape {
    #[default]
    Round,
    Rect,
    Octagon,
}

/// Pad in footprint coordinates, with its holes in pad coordinates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintPad {
    pub name: String,
    pub position: Point,
    #[serde(default)]
    pub rotation: Angle,
    #[serde(default)]
    pub shape: PadShape,
    pub width: Length,
    pub height: Length,
    #[serde(default)]
    pub component_side: ComponentSide,
    #[serde(default)]
    pub holes: Vec<Hole>,
    #[serde(default)]
    pub net: Option<NetSignalId>,
}

impl FootprintPad {
    pub fn is_tht(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Pad coordinates to footprint coordinates
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, false)
    }

    /// Pad outline grown (or shrunk) by `expansion`, in pad coordinates
    pub fn outline(&self, expansion: Length) -> Option<Path> {
        let width = self.width + expansion * 2;
        let height = self.height + expansion * 2;
        if width <= Length::ZERO || height <= Length::ZERO {
            return None;
        }
        Some(match self.shape {
            PadShape::Round => Path::obround_centered(width, height),
            PadShape::Rect => Path::centered_rect(width, height),
            PadShape::Octagon => Path::octagon(width, height),
        })
    }

    /// Outlines of this pad on a board layer, in pad coordinates.
    ///
    /// `mirrored` is the placement of the owning device, which moves SMT pads
    /// to the other board side.
    pub fn outlines_on_layer(&self, layer: &str, mirrored: bool, rules: &RuleSet, expansion: Length) -> Vec<Path> {
        let side = if mirrored {
            self.component_side.flipped()
        } else {
            self.component_side
        };
        let has_top = self.is_tht() || side == ComponentSide::Top;
        let has_bottom = self.is_tht() || side == ComponentSide::Bottom;
        let on_side = |top: &str, bottom: &str| (layer == top && has_top) || (layer == bottom && has_bottom);
        let size = self.width.min(self.height);

        if on_side(TOP_COPPER, BOT_COPPER) {
            self.outline(expansion).into_iter().collect()
        } else if is_copper_layer(layer) && is_inner_copper_layer(layer) {
            // Inner layers only carry annular rings around the holes
            self.holes
                .iter()
                .flat_map(|hole| {
                    let ring = rules.calc_pad_annular_ring(hole.diameter) + expansion;
                    hole.path.to_outline_strokes(hole.diameter + ring * 2)
                })
                .collect()
        } else if on_side(TOP_STOP_MASK, BOT_STOP_MASK) {
            let clearance = rules.calc_stop_mask_clearance(size) + expansion;
            self.outline(clearance).into_iter().collect()
        } else if on_side(TOP_SOLDER_PASTE, BOT_SOLDER_PASTE) {
            // Paste is reduced relative to the copper
            let reduction = rules.calc_cream_mask_clearance(size) - expansion;
            self.outline(-reduction).into_iter().collect()
        } else {
            Vec::new()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footprint {
    pub pads: Vec<FootprintPad>,
    /// Non-plated package holes
    pub holes: Vec<Hole>,
    pub polygons: Vec<PolygonShape>,
    pub circles: Vec<CircleShape>,
}

/// A placed component instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub position: Point,
    #[serde(default)]
    pub rotation: Angle,
    #[serde(default)]
    pub mirrored: bool,
    pub footprint: Footprint,
    /// Texts already placed in board coordinates
    #[serde(default)]
    pub stroke_texts: Vec<StrokeText>,
}

impl Device {
    pub fn new(name: impl Into<String>, position: Point, footprint: Footprint) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: Angle::ZERO,
            mirrored: false,
            footprint,
            stroke_texts: Vec::new(),
        }
    }

    /// Footprint coordinates to board coordinates
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.mirrored)
    }

    /// Map a path given in pad coordinates into board coordinates
    pub fn pad_to_board(&self, pad: &FootprintPad, path: &Path) -> Path {
        self.transform().map_path(&pad.transform().map_path(path))
    }

    /// Text shown for a pad in messages, e.g. `1: GND`
    pub fn pad_display_text(&self, pad: &FootprintPad, net_name: Option<&str>) -> String {
        match net_name {
            Some(net) if !net.is_empty() => format!("{}: {}", pad.name, net),
            _ => pad.name.clone(),
        }
    }
}
