//! Design Rule Check (DRC) for boards
//!
//! Builds polygon sets from board items, runs the enabled check passes in a
//! fixed order and reports violations together with a progress/status
//! event stream. Copper clearances use an R-tree pre-filter and exact
//! integer distance tests.
//!
//! # Submodules
//! - `algebra` - Polygon sets with boolean operations and offsetting
//! - `distance` - Exact segment predicates for clearance decisions
//! - `paths` - Polygon generation per layer and net
//! - `types` - Violations, events and the run report
//! - `listener` - Event receivers
//! - `checks` - The check passes and per-run state
//! - `engine` - Synchronous runner
//! - `background` - Runner on a worker thread

mod algebra;
mod background;
mod checks;
mod distance;
mod engine;
mod listener;
mod paths;
mod types;

pub use algebra::{contour_to_path, Contour, PolygonSet, Region, Regions, MAX_COORDINATE, MIN_REGION_AREA};
pub use background::{run_in_background, BackgroundRun};
pub use engine::{check_board, CheckEngine, EngineState};
pub use listener::{DrcListener, NullListener};
pub use paths::{NetFilter, PathGenerator};
pub use types::{CheckKind, DrcEvent, DrcReport, Severity, Violation};
