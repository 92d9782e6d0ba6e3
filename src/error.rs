//! Error type shared by the rule set, the polygon layer and the check engine.

use thiserror::Error;

/// Everything that can stop a design rule check from producing a result.
///
/// Violations are not errors: a run that finds problems still returns `Ok`.
#[derive(Debug, Error)]
pub enum DrcError {
    /// Invalid rule bounds or options, raised before any run starts.
    #[error("{0}")]
    Configuration(String),

    /// Unexpected failure inside the polygon algebra. Aborts the run.
    #[error("Geometry failure: {0}")]
    Geometry(String),

    /// The plane/air-wire collaborator could not deliver its data.
    #[error("Board services failed: {0}")]
    Collaborator(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DrcError>;

impl DrcError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        DrcError::Configuration(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        DrcError::Geometry(msg.into())
    }

    /// Whether this is a configuration problem rather than a failed run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DrcError::Configuration(_))
    }
}
