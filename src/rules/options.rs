//! Per-run check options
//!
//! Options are owned by the caller and independent of the board's
//! [`RuleSet`](super::RuleSet). A partial JSON document only overrides the
//! fields it names; everything else keeps its default.

use crate::error::{DrcError, Result};
use crate::geometry::Length;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Which slot shapes produce an advisory (ordered by how much gets reported)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotsWarningLevel {
    None,
    #[default]
    Curved,
    MultiSegment,
    All,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    pub rebuild_planes: bool,
    pub check_copper_board_clearance: bool,
    pub min_copper_board_clearance: Length,
    pub check_copper_npth_clearance: bool,
    pub min_copper_npth_clearance: Length,
    pub check_copper_copper_clearance: bool,
    pub min_copper_copper_clearance: Length,
    pub check_courtyard_clearance: bool,
    pub courtyard_offset: Length,
    pub check_copper_width: bool,
    pub min_copper_width: Length,
    pub check_pth_annular_ring: bool,
    pub min_pth_annular_ring: Length,
    pub check_npth_drill_diameter: bool,
    pub min_npth_drill_diameter: Length,
    pub check_pth_drill_diameter: bool,
    pub min_pth_drill_diameter: Length,
    pub check_npth_slot_width: bool,
    pub min_npth_slot_width: Length,
    pub check_pth_slot_width: bool,
    pub min_pth_slot_width: Length,
    pub check_npth_slots_warning: bool,
    pub npth_slots_warning: SlotsWarningLevel,
    pub check_pth_slots_warning: bool,
    pub pth_slots_warning: SlotsWarningLevel,
    pub check_missing_connections: bool,
    /// Maximum deviation of flattened arcs from the true curve
    pub max_arc_tolerance: Length,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            rebuild_planes: true,
            check_copper_board_clearance: true,
            min_copper_board_clearance: Length::from_nm(300_000), // 0.3mm
            check_copper_npth_clearance: true,
            min_copper_npth_clearance: Length::from_nm(250_000),
            check_copper_copper_clearance: true,
            min_copper_copper_clearance: Length::from_nm(200_000),
            check_courtyard_clearance: true,
            courtyard_offset: Length::ZERO,
            check_copper_width: true,
            min_copper_width: Length::from_nm(200_000),
            check_pth_annular_ring: true,
            min_pth_annular_ring: Length::from_nm(200_000),
            check_npth_drill_diameter: true,
            min_npth_drill_diameter: Length::from_nm(300_000),
            check_pth_drill_diameter: true,
            min_pth_drill_diameter: Length::from_nm(300_000),
            check_npth_slot_width: true,
            min_npth_slot_width: Length::from_nm(1_000_000),
            check_pth_slot_width: true,
            min_pth_slot_width: Length::from_nm(700_000),
            check_npth_slots_warning: true,
            npth_slots_warning: SlotsWarningLevel::Curved,
            check_pth_slots_warning: true,
            pth_slots_warning: SlotsWarningLevel::MultiSegment,
            check_missing_connections: true,
            max_arc_tolerance: Length::from_nm(5_000), // 5um
        }
    }
}

impl CheckOptions {
    /// Options with every check switched off, as a base for selective runs
    pub fn none() -> Self {
        Self {
            rebuild_planes: false,
            check_copper_board_clearance: false,
            check_copper_npth_clearance: false,
            check_copper_copper_clearance: false,
            check_courtyard_clearance: false,
            check_copper_width: false,
            check_pth_annular_ring: false,
            check_npth_drill_diameter: false,
            check_pth_drill_diameter: false,
            check_npth_slot_width: false,
            check_pth_slot_width: false,
            check_npth_slots_warning: false,
            check_pth_slots_warning: false,
            check_missing_connections: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: CheckOptions = serde_json::from_str(json)
            .map_err(|e| DrcError::configuration(format!("Invalid check options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        Ok(Self::from_json_str(&json)?)
    }

    /// Reject values no run could use meaningfully
    pub fn validate(&self) -> Result<()> {
        if self.max_arc_tolerance <= Length::ZERO {
            return Err(DrcError::configuration("Arc tolerance must be > 0"));
        }
        let minimums = [
            ("Copper/board clearance", self.min_copper_board_clearance),
            ("Copper/NPTH clearance", self.min_copper_npth_clearance),
            ("Copper/copper clearance", self.min_copper_copper_clearance),
            ("Copper width", self.min_copper_width),
            ("PTH annular ring", self.min_pth_annular_ring),
            ("NPTH drill diameter", self.min_npth_drill_diameter),
            ("PTH drill diameter", self.min_pth_drill_diameter),
            ("NPTH slot width", self.min_npth_slot_width),
            ("PTH slot width", self.min_pth_slot_width),
        ];
        for (what, value) in minimums {
            if value < Length::ZERO {
                return Err(DrcError::configuration(format!("{} must be >= 0", what)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_level_order() {
        assert!(SlotsWarningLevel::None < SlotsWarningLevel::Curved);
        assert!(SlotsWarningLevel::Curved < SlotsWarningLevel::MultiSegment);
        assert!(SlotsWarningLevel::MultiSegment < SlotsWarningLevel::All);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = CheckOptions::from_json_str(
            r#"{ "min_copper_width": 150000, "pth_slots_warning": "all", "check_courtyard_clearance": false }"#,
        )
        .unwrap();
        assert_eq!(options.min_copper_width, Length::from_nm(150_000));
        assert_eq!(options.pth_slots_warning, SlotsWarningLevel::All);
        assert!(!options.check_courtyard_clearance);
        assert_eq!(options.min_copper_copper_clearance, Length::from_nm(200_000));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let err = CheckOptions::from_json_str(r#"{ "max_arc_tolerance": 0 }"#).unwrap_err();
        assert!(err.is_configuration());
    }
}
