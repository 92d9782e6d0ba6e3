//! Placement transform (mirror, rotate, translate)

use super::path::Path;
use super::units::{Angle, Point};
use serde::{Deserialize, Serialize};

/// Maps local coordinates into the parent coordinate system.
///
/// Mirroring flips x before the rotation is applied, the way a device placed
/// on the bottom side is flipped around its own origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point,
    pub rotation: Angle,
    pub mirrored: bool,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Point::from_nm(0, 0),
        rotation: Angle::ZERO,
        mirrored: false,
    };

    pub fn new(position: Point, rotation: Angle, mirrored: bool) -> Self {
        Self {
            position,
            rotation,
            mirrored,
        }
    }

    pub fn translation(position: Point) -> Self {
        Self::new(position, Angle::ZERO, false)
    }

    pub fn map(&self, point: Point) -> Point {
        let p = if self.mirrored { point.mirrored() } else { point };
        p.rotated(self.rotation) + self.position
    }

    /// Arc angles change sign when the coordinate system is mirrored
    pub fn map_arc_angle(&self, angle: Angle) -> Angle {
        if self.mirrored {
            -angle
        } else {
            angle
        }
    }

    pub fn map_path(&self, path: &Path) -> Path {
        path.map_vertices(|p| self.map(p), |a| self.map_arc_angle(a))
    }

    pub fn map_paths(&self, paths: &[Path]) -> Vec<Path> {
        paths.iter().map(|p| self.map_path(p)).collect()
    }

    /// Swap `top_`/`bot_` layers when mirrored
    pub fn map_layer<'a>(&self, layer: &'a str) -> std::borrow::Cow<'a, str> {
        if self.mirrored {
            std::borrow::Cow::Owned(crate::board::mirrored_layer_name(layer))
        } else {
            std::borrow::Cow::Borrowed(layer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_then_rotate_then_translate() {
        let t = Transform::new(Point::from_nm(100, 0), Angle::DEG90, true);
        // (10, 0) -> mirrored (-10, 0) -> rotated (0, -10) -> moved (100, -10)
        assert_eq!(t.map(Point::from_nm(10, 0)), Point::from_nm(100, -10));
    }

    #[test]
    fn test_layer_mapping() {
        let t = Transform::new(Point::default(), Angle::ZERO, true);
        assert_eq!(t.map_layer("top_cu"), "bot_cu");
        assert_eq!(t.map_layer("in1_cu"), "in1_cu");
        assert_eq!(Transform::IDENTITY.map_layer("top_cu"), "top_cu");
    }
}
