//! DRC data types and structures
//!
//! Contains violation records, the event stream and the run report.

use crate::geometry::Path;
use serde::Serialize;

/// Which pass produced a violation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    BoardClearance,
    CopperClearance,
    CopperWidth,
    AnnularRing,
    DrillDiameter,
    SlotWidth,
    SlotShape,
    CourtyardClearance,
    MissingConnection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Violation,
    /// Style or manufacturability hint, not an error
    Advisory,
}

/// One finding of a run, with the areas to highlight
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: CheckKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Layer the violation was found on, if it is layer specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    pub locations: Vec<Path>,
}

impl Violation {
    pub fn new(kind: CheckKind, message: impl Into<String>, locations: Vec<Path>) -> Self {
        Self {
            kind,
            severity: Severity::Violation,
            message: message.into(),
            description: None,
            layer: None,
            locations,
        }
    }

    pub fn advisory(mut self) -> Self {
        self.severity = Severity::Advisory;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn is_advisory(&self) -> bool {
        self.severity == Severity::Advisory
    }
}

/// Events of one run, delivered in the order they happen
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum DrcEvent {
    Started,
    Status(String),
    /// Percentage, never decreasing within a run
    Progress(u8),
    Violation(Violation),
    Finished { violations: usize },
}

/// Result of a completed run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DrcReport {
    pub violations: Vec<Violation>,
    /// Every status line in the order it was reported
    pub status: Vec<String>,
}

impl DrcReport {
    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }

    pub fn count(&self, kind: CheckKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    pub fn advisory_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_advisory()).count()
    }
}
