//! Geometry primitives for board data
//!
//! Fixed-point units, vertex paths with arcs and placement transforms.
//!
//! # Submodules
//! - `units` - Length, Ratio, Angle and Point
//! - `path` - Vertex paths, canonical shapes and arc flattening
//! - `transform` - Mirror/rotate/translate placement

mod path;
mod transform;
mod units;

pub use path::{FlattenMode, Path, Vertex};
pub use transform::Transform;
pub use units::{Angle, Length, Point, Ratio};
