//! Persisted board design rules
//!
//! Mask clearances and annular rings are derived from a base dimension as
//! `clamp(base * ratio, min, max)`. The bounds are validated whenever they
//! change, so a `RuleSet` value always satisfies `min <= max`.

use crate::error::{DrcError, Result};
use crate::geometry::{Length, Ratio};
use serde::{Deserialize, Serialize};

/// A ratio with lower and upper bound for the derived value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundedRatio {
    ratio: Ratio,
    min: Length,
    max: Length,
}

impl BoundedRatio {
    const fn new_unchecked(ratio: Ratio, min: Length, max: Length) -> Self {
        Self { ratio, min, max }
    }

    pub fn ratio(&self) -> Ratio {
        self.ratio
    }

    pub fn min(&self) -> Length {
        self.min
    }

    pub fn max(&self) -> Length {
        self.max
    }

    /// `clamp(base * ratio, min, max)`
    pub fn calc(&self, base: Length) -> Length {
        base.scaled(self.ratio).max(self.min).min(self.max)
    }

    fn set_bounds(&mut self, what: &str, min: Length, max: Length) -> Result<()> {
        if min < Length::ZERO {
            return Err(DrcError::configuration(format!("{}: MIN must be >= 0", what)));
        }
        if max < min {
            return Err(DrcError::configuration(format!("{}: MAX must be >= MIN", what)));
        }
        self.min = min;
        self.max = max;
        Ok(())
    }
}

const DEFAULT_NAME: &str = "LibrePCB Default Design Rules";

/// Design rules owned by the board
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleSetData", into = "RuleSetData")]
pub struct RuleSet {
    name: String,
    description: String,
    stop_mask_clearance: BoundedRatio,
    stop_mask_max_via_drill_diameter: Length,
    cream_mask_clearance: BoundedRatio,
    pad_annular_ring: BoundedRatio,
    via_annular_ring: BoundedRatio,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: String::new(),
            stop_mask_clearance: BoundedRatio::new_unchecked(
                Ratio::ZERO,
                Length::from_nm(100_000), // 0.1mm
                Length::from_nm(100_000),
            ),
            stop_mask_max_via_drill_diameter: Length::from_nm(500_000),
            cream_mask_clearance: BoundedRatio::new_unchecked(
                Ratio::from_ppm(100_000), // 10%
                Length::ZERO,
                Length::from_nm(1_000_000),
            ),
            pad_annular_ring: BoundedRatio::new_unchecked(
                Ratio::from_ppm(250_000), // 25%
                Length::from_nm(250_000),
                Length::from_nm(2_000_000),
            ),
            via_annular_ring: BoundedRatio::new_unchecked(
                Ratio::from_ppm(250_000),
                Length::from_nm(200_000),
                Length::from_nm(2_000_000),
            ),
        }
    }
}

impl RuleSet {
    /// Build a rule set from raw values, rejecting inverted or negative bounds
    pub fn new(data: RuleSetData) -> Result<Self> {
        let mut rules = RuleSet::default();
        rules
            .apply(data)
            .map_err(|e| DrcError::configuration(format!("Invalid design rules: {}", e)))?;
        Ok(rules)
    }

    fn apply(&mut self, data: RuleSetData) -> Result<()> {
        self.set_name(data.name);
        self.set_description(data.description);
        self.set_stop_mask_clearance_ratio(data.stop_mask_clearance_ratio);
        self.set_stop_mask_clearance_bounds(data.stop_mask_clearance_min, data.stop_mask_clearance_max)?;
        self.set_stop_mask_max_via_drill_diameter(data.stop_mask_max_via_drill_diameter);
        self.set_cream_mask_clearance_ratio(data.cream_mask_clearance_ratio);
        self.set_cream_mask_clearance_bounds(data.cream_mask_clearance_min, data.cream_mask_clearance_max)?;
        self.set_pad_annular_ring_ratio(data.pad_annular_ring_ratio);
        self.set_pad_annular_ring_bounds(data.pad_annular_ring_min, data.pad_annular_ring_max)?;
        self.set_via_annular_ring_ratio(data.via_annular_ring_ratio);
        self.set_via_annular_ring_bounds(data.via_annular_ring_min, data.via_annular_ring_max)?;
        Ok(())
    }

    pub fn restore_defaults(&mut self) {
        *self = RuleSet::default();
    }

    // Getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stop_mask_clearance(&self) -> BoundedRatio {
        self.stop_mask_clearance
    }

    pub fn stop_mask_max_via_drill_diameter(&self) -> Length {
        self.stop_mask_max_via_drill_diameter
    }

    pub fn cream_mask_clearance(&self) -> BoundedRatio {
        self.cream_mask_clearance
    }

    pub fn pad_annular_ring(&self) -> BoundedRatio {
        self.pad_annular_ring
    }

    pub fn via_annular_ring(&self) -> BoundedRatio {
        self.via_annular_ring
    }

    // Setters

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_stop_mask_clearance_ratio(&mut self, ratio: Ratio) {
        self.stop_mask_clearance.ratio = ratio;
    }

    pub fn set_stop_mask_clearance_bounds(&mut self, min: Length, max: Length) -> Result<()> {
        self.stop_mask_clearance.set_bounds("Stop mask clearance", min, max)
    }

    pub fn set_stop_mask_max_via_drill_diameter(&mut self, diameter: Length) {
        self.stop_mask_max_via_drill_diameter = diameter;
    }

    pub fn set_cream_mask_clearance_ratio(&mut self, ratio: Ratio) {
        self.cream_mask_clearance.ratio = ratio;
    }

    pub fn set_cream_mask_clearance_bounds(&mut self, min: Length, max: Length) -> Result<()> {
        self.cream_mask_clearance.set_bounds("Cream mask clearance", min, max)
    }

    pub fn set_pad_annular_ring_ratio(&mut self, ratio: Ratio) {
        self.pad_annular_ring.ratio = ratio;
    }

    pub fn set_pad_annular_ring_bounds(&mut self, min: Length, max: Length) -> Result<()> {
        self.pad_annular_ring.set_bounds("Pads annular ring", min, max)
    }

    pub fn set_via_annular_ring_ratio(&mut self, ratio: Ratio) {
        self.via_annular_ring.ratio = ratio;
    }

    pub fn set_via_annular_ring_bounds(&mut self, min: Length, max: Length) -> Result<()> {
        self.via_annular_ring.set_bounds("Vias annular ring", min, max)
    }

    // Derived values

    /// Vias with a drill above the threshold get a stop mask opening
    pub fn does_via_require_stop_mask(&self, drill_diameter: Length) -> bool {
        drill_diameter > self.stop_mask_max_via_drill_diameter
    }

    pub fn calc_stop_mask_clearance(&self, pad_size: Length) -> Length {
        self.stop_mask_clearance.calc(pad_size)
    }

    pub fn calc_cream_mask_clearance(&self, pad_size: Length) -> Length {
        self.cream_mask_clearance.calc(pad_size)
    }

    pub fn calc_pad_annular_ring(&self, drill_diameter: Length) -> Length {
        self.pad_annular_ring.calc(drill_diameter)
    }

    pub fn calc_via_annular_ring(&self, drill_diameter: Length) -> Length {
        self.via_annular_ring.calc(drill_diameter)
    }
}

/// Flat, unvalidated form of a [`RuleSet`] as it is stored and loaded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetData {
    pub name: String,
    pub description: String,
    pub stop_mask_clearance_ratio: Ratio,
    pub stop_mask_clearance_min: Length,
    pub stop_mask_clearance_max: Length,
    pub stop_mask_max_via_drill_diameter: Length,
    pub cream_mask_clearance_ratio: Ratio,
    pub cream_mask_clearance_min: Length,
    pub cream_mask_clearance_max: Length,
    pub pad_annular_ring_ratio: Ratio,
    pub pad_annular_ring_min: Length,
    pub pad_annular_ring_max: Length,
    pub via_annular_ring_ratio: Ratio,
    pub via_annular_ring_min: Length,
    pub via_annular_ring_max: Length,
}

impl Default for RuleSetData {
    fn default() -> Self {
        RuleSet::default().into()
    }
}

impl From<RuleSet> for RuleSetData {
    fn from(rules: RuleSet) -> Self {
        Self {
            name: rules.name,
            description: rules.description,
            stop_mask_clearance_ratio: rules.stop_mask_clearance.ratio,
            stop_mask_clearance_min: rules.stop_mask_clearance.min,
            stop_mask_clearance_max: rules.stop_mask_clearance.max,
            stop_mask_max_via_drill_diameter: rules.stop_mask_max_via_drill_diameter,
            cream_mask_clearance_ratio: rules.cream_mask_clearance.ratio,
            cream_mask_clearance_min: rules.cream_mask_clearance.min,
            cream_mask_clearance_max: rules.cream_mask_clearance.max,
            pad_annular_ring_ratio: rules.pad_annular_ring.ratio,
            pad_annular_ring_min: rules.pad_annular_ring.min,
            pad_annular_ring_max: rules.pad_annular_ring.max,
            via_annular_ring_ratio: rules.via_annular_ring.ratio,
            via_annular_ring_min: rules.via_annular_ring.min,
            via_annular_ring_max: rules.via_annular_ring.max,
        }
    }
}

impl TryFrom<RuleSetData> for RuleSet {
    type Error = DrcError;

    fn try_from(data: RuleSetData) -> Result<Self> {
        RuleSet::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mm(v: f64) -> Length {
        Length::from_mm(v)
    }

    #[test]
    fn test_defaults() {
        let rules = RuleSet::default();
        assert_eq!(rules.name(), "LibrePCB Default Design Rules");
        assert_eq!(rules.calc_pad_annular_ring(mm(0.3)), mm(0.25)); // 25% of 0.3 is below min
        assert_eq!(rules.calc_pad_annular_ring(mm(2.0)), mm(0.5));
        assert_eq!(rules.calc_stop_mask_clearance(mm(5.0)), mm(0.1));
        assert!(rules.does_via_require_stop_mask(mm(0.6)));
        assert!(!rules.does_via_require_stop_mask(mm(0.5)));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut rules = RuleSet::default();
        let err = rules.set_via_annular_ring_bounds(mm(0.3), mm(0.2)).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Vias annular ring: MAX must be >= MIN");
        // Unchanged after the failed update
        assert_eq!(rules.via_annular_ring().min(), mm(0.2));
    }

    #[test]
    fn test_constructor_wraps_error() {
        let data = RuleSetData {
            pad_annular_ring_min: mm(0.3),
            pad_annular_ring_max: mm(0.2),
            ..RuleSetData::default()
        };
        let err = RuleSet::new(data).unwrap_err();
        assert_eq!(err.to_string(), "Invalid design rules: Pads annular ring: MAX must be >= MIN");
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{ "cream_mask_clearance_min": 500000, "cream_mask_clearance_max": 100 }"#;
        let parsed: std::result::Result<RuleSet, _> = serde_json::from_str(json);
        assert!(parsed.is_err());

        let json = r#"{ "name": "Fab A", "via_annular_ring_min": 150000 }"#;
        let rules: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.name(), "Fab A");
        assert_eq!(rules.via_annular_ring().min(), Length::from_nm(150_000));
    }

    #[test]
    fn test_restore_defaults() {
        let mut rules = RuleSet::default();
        rules.set_name("Custom");
        rules.set_pad_annular_ring_ratio(Ratio::from_percent(50.0));
        rules.restore_defaults();
        assert_eq!(rules, RuleSet::default());
    }

    proptest! {
        #[test]
        fn prop_inverted_bounds_always_fail(min in 1i64..10_000_000, delta in 1i64..1_000_000) {
            let mut rules = RuleSet::default();
            let (min, max) = (Length::from_nm(min), Length::from_nm(min - delta));
            prop_assert!(rules.set_stop_mask_clearance_bounds(min, max).is_err());
            prop_assert!(rules.set_cream_mask_clearance_bounds(min, max).is_err());
            prop_assert!(rules.set_pad_annular_ring_bounds(min, max).is_err());
            prop_assert!(rules.set_via_annular_ring_bounds(min, max).is_err());
        }

        #[test]
        fn prop_calc_within_bounds_and_monotonic(
            ppm in 0i64..=1_000_000,
            min in 0i64..5_000_000,
            span in 0i64..5_000_000,
            base in -10_000_000i64..10_000_000,
            step in 0i64..1_000_000,
        ) {
            let mut rules = RuleSet::default();
            rules.set_pad_annular_ring_ratio(Ratio::from_ppm(ppm));
            rules.set_pad_annular_ring_bounds(Length::from_nm(min), Length::from_nm(min + span)).unwrap();
            let a = rules.calc_pad_annular_ring(Length::from_nm(base));
            let b = rules.calc_pad_annular_ring(Length::from_nm(base + step));
            prop_assert!(a >= Length::from_nm(min) && a <= Length::from_nm(min + span));
            prop_assert!(a >= Length::ZERO);
            prop_assert!(b >= a);
            prop_assert_eq!(a, rules.calc_pad_annular_ring(Length::from_nm(base)));
        }
    }
}
