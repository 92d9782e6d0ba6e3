//! Design rules and check options
//!
//! # Submodules
//! - `design_rules` - The board's persisted [`RuleSet`]
//! - `options` - Per-run [`CheckOptions`]

mod design_rules;
mod options;

pub use design_rules::{BoundedRatio, RuleSet, RuleSetData};
pub use options::{CheckOptions, SlotsWarningLevel};
