//! Board items: holes, net segments, planes, graphics and air wires

use super::NetSignalId;
use crate::geometry::{Angle, Length, Path, Point, Transform};
use serde::{Deserialize, Serialize};

/// Drilled hole. A path with one vertex is a round drill, anything longer
/// is a slot of width `diameter` along the path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    pub diameter: Length,
    pub path: Path,
}

/// Slot shapes ordered by how unusual they are for a fab
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotShape {
    Plain,
    MultiSegment,
    Curved,
}

impl Hole {
    pub fn round(position: Point, diameter: Length) -> Self {
        Self {
            diameter,
            path: Path::from_points([position]),
        }
    }

    pub fn slot(path: Path, width: Length) -> Self {
        Self {
            diameter: width,
            path,
        }
    }

    pub fn is_slot(&self) -> bool {
        self.path.len() > 1
    }

    pub fn is_multi_segment_slot(&self) -> bool {
        self.path.len() > 2
    }

    pub fn is_curved_slot(&self) -> bool {
        self.path.is_curved()
    }

    /// Classification of a slot, most unusual shape first; `None` for drills
    pub fn slot_shape(&self) -> Option<SlotShape> {
        if self.is_curved_slot() {
            Some(SlotShape::Curved)
        } else if self.is_multi_segment_slot() {
            Some(SlotShape::MultiSegment)
        } else if self.is_slot() {
            Some(SlotShape::Plain)
        } else {
            None
        }
    }

    /// Outline of the drilled area in parent coordinates
    pub fn outlines(&self, transform: &Transform) -> Vec<Path> {
        transform.map_paths(&self.path.to_outline_strokes(self.diameter))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViaShape {
    #[default]
    Round,
    Square,
    Octagon,
}

/// Plated through-hole connecting all copper layers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via {
    pub position: Point,
    #[serde(default)]
    pub shape: ViaShape,
    pub size: Length,
    pub drill_diameter: Length,
}

impl Via {
    pub fn new(position: Point, size: Length, drill_diameter: Length) -> Self {
        Self {
            position,
            shape: ViaShape::Round,
            size,
            drill_diameter,
        }
    }

    /// Copper outline grown by `expansion`, in board coordinates
    pub fn outline(&self, expansion: Length) -> Option<Path> {
        let size = self.size + expansion * 2;
        if size <= Length::ZERO {
            return None;
        }
        let local = match self.shape {
            ViaShape::Round => Path::circle(size),
            ViaShape::Square => Path::centered_rect(size, size),
            ViaShape::Octagon => Path::octagon(size, size),
        };
        Some(local.translated(self.position))
    }
}

/// A straight trace on one copper layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetLine {
    pub layer: String,
    pub start: Point,
    pub end: Point,
    pub width: Length,
}

impl NetLine {
    pub fn new(layer: impl Into<String>, start: Point, end: Point, width: Length) -> Self {
        Self {
            layer: layer.into(),
            start,
            end,
            width,
        }
    }

    pub fn outline(&self, width: Length) -> Path {
        Path::obround(self.start, self.end, width)
    }
}

/// Vias and traces of one net (or of no net)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSegment {
    #[serde(default)]
    pub net: Option<NetSignalId>,
    #[serde(default)]
    pub vias: Vec<Via>,
    #[serde(default)]
    pub lines: Vec<NetLine>,
}

/// Copper pour. `fragments` holds the last computed fill as even-odd rings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {
    pub net: NetSignalId,
    pub layer: String,
    pub outline: Path,
    pub min_width: Length,
    #[serde(default)]
    pub fragments: Vec<Path>,
}

/// Polygon graphic. Filled polygons on copper layers are copper areas;
/// rings on the outline layer describe the board shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonShape {
    pub layer: String,
    pub path: Path,
    #[serde(default)]
    pub line_width: Length,
    #[serde(default)]
    pub filled: bool,
}

impl PolygonShape {
    pub fn new(layer: impl Into<String>, path: Path, line_width: Length, filled: bool) -> Self {
        Self {
            layer: layer.into(),
            path,
            line_width,
            filled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleShape {
    pub layer: String,
    pub center: Point,
    pub diameter: Length,
    #[serde(default)]
    pub line_width: Length,
    #[serde(default)]
    pub filled: bool,
}

/// Text already converted to stroke paths (in text coordinates)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeText {
    pub layer: String,
    pub position: Point,
    #[serde(default)]
    pub rotation: Angle,
    #[serde(default)]
    pub mirrored: bool,
    pub stroke_width: Length,
    pub paths: Vec<Path>,
}

impl StrokeText {
    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.mirrored)
    }

    /// Stroke outlines in board coordinates
    pub fn outlines(&self, width: Length) -> Vec<Path> {
        let transform = self.transform();
        self.paths
            .iter()
            .flat_map(|p| transform.map_path(p).to_outline_strokes(width))
            .collect()
    }
}

/// Unrouted connection reported by the connectivity collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirWire {
    pub net: NetSignalId,
    pub p1: Point,
    pub p2: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> Point {
        Point::from_nm(x, y)
    }

    #[test]
    fn test_slot_classification_priority() {
        let drill = Hole::round(p(0, 0), Length::from_mm(0.3));
        assert_eq!(drill.slot_shape(), None);

        let slot = Hole::slot(Path::from_points([p(0, 0), p(1000, 0)]), Length::from_mm(1.0));
        assert_eq!(slot.slot_shape(), Some(SlotShape::Plain));

        let multi = Hole::slot(Path::from_points([p(0, 0), p(1000, 0), p(1000, 1000)]), Length::from_mm(1.0));
        assert_eq!(multi.slot_shape(), Some(SlotShape::MultiSegment));

        let curved_multi = Hole::slot(
            Path::new(vec![
                crate::geometry::Vertex::new(p(0, 0), Angle::DEG90),
                crate::geometry::Vertex::straight(p(1000, 0)),
                crate::geometry::Vertex::straight(p(1000, 1000)),
            ]),
            Length::from_mm(1.0),
        );
        assert!(curved_multi.is_multi_segment_slot());
        assert_eq!(curved_multi.slot_shape(), Some(SlotShape::Curved));
    }

    #[test]
    fn test_via_outline_shapes() {
        let mut via = Via::new(p(1000, 1000), Length::from_nm(600), Length::from_nm(300));
        assert_eq!(via.outline(Length::ZERO), Some(Path::circle_at(p(1000, 1000), Length::from_nm(600))));
        via.shape = ViaShape::Square;
        let square = via.outline(Length::from_nm(50)).unwrap();
        assert!((square.signed_area() - 700.0 * 700.0).abs() < 1.0);
        assert_eq!(via.outline(Length::from_nm(-400)), None);
    }
}
