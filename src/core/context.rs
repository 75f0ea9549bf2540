//! Process capability context.

use serde::{Deserialize, Serialize};

/// Which side of the process boundary is evaluating toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationTarget {
    /// Server-side evaluation; frontend-only toggles are excluded.
    #[default]
    Backend,
    /// Client-side evaluation.
    Frontend,
}

/// Process-level facts that constraints are checked against.
///
/// Computed at startup and replaced only on explicit reconfiguration, such as
/// a license renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CapabilityContext {
    /// A valid license is present.
    pub licensed: bool,
    /// The process runs in development mode.
    pub dev_mode: bool,
    /// The evaluating side.
    pub target: EvaluationTarget,
}

impl CapabilityContext {
    /// Unlicensed, production, backend evaluation.
    pub fn backend() -> Self {
        Self::default()
    }

    /// Set the license claim.
    pub fn with_license(mut self, licensed: bool) -> Self {
        self.licensed = licensed;
        self
    }

    /// Set development mode.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Set the evaluation target.
    pub fn with_target(mut self, target: EvaluationTarget) -> Self {
        self.target = target;
        self
    }
}
