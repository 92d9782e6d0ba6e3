//! Design rule checking for printed circuit boards
//!
//! A [`Board`](board::Board) snapshot is checked against caller supplied
//! [`CheckOptions`](rules::CheckOptions). The result is a list of
//! [`Violation`](drc::Violation)s, each with a message and the outlines
//! where the problem is.
//!
//! # Modules
//! - `geometry` - Units, paths and transforms
//! - `rules` - Board design rules and per-run options
//! - `board` - The board snapshot and its collaborator services
//! - `drc` - Polygon algebra, path generation and the check engine
//! - `error` - Error type

pub mod board;
pub mod drc;
pub mod error;
pub mod geometry;
pub mod rules;

pub use drc::{check_board, run_in_background, CheckEngine, DrcEvent, DrcReport, Violation};
pub use error::{DrcError, Result};
