//! Immutable resolved toggle state.

use crate::catalog::Constraint;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// The definition's default expression.
    Default,
    /// The highest-ranked source holding a value, by source name.
    Override(String),
    /// A constraint forced the toggle off.
    ConstraintDenied(Constraint),
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Override(source) => write!(f, "override-{}", source),
            Self::ConstraintDenied(constraint) => {
                write!(f, "constraint-denied:{}", constraint.denial_reason())
            }
        }
    }
}

impl Serialize for ResolutionSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One toggle's resolved state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedToggle {
    /// Effective value.
    pub enabled: bool,
    /// Changes are deferred until restart.
    pub requires_restart: bool,
    /// Origin of `enabled`.
    pub source: ResolutionSource,
    /// For restart-required toggles: the value the next process start would
    /// pick up, when it differs from `enabled`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
}

/// Immutable mapping from toggle name to resolved state.
///
/// Built once per resolution cycle and never mutated afterwards. Iteration is
/// ordered by name, so two snapshots built from the same inputs compare and
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    toggles: BTreeMap<String, ResolvedToggle>,
}

impl Snapshot {
    pub(crate) fn from_toggles(toggles: BTreeMap<String, ResolvedToggle>) -> Self {
        Self { toggles }
    }

    /// Effective value; unknown names are disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.toggles.get(name).is_some_and(|t| t.enabled)
    }

    /// Resolved state of one toggle.
    pub fn get(&self, name: &str) -> Option<&ResolvedToggle> {
        self.toggles.get(name)
    }

    /// All resolved toggles, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedToggle)> {
        self.toggles.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Names of enabled toggles, ordered by name.
    pub fn enabled(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, t)| t.enabled)
            .map(|(name, _)| name)
            .collect()
    }

    /// Restart-required toggles with a deferred change.
    pub fn pending_changes(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, t)| t.pending.is_some())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names whose effective value differs from `previous`.
    pub fn changed_since(&self, previous: &Snapshot) -> Vec<String> {
        self.iter()
            .filter(|(name, t)| previous.is_enabled(name) != t.enabled)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Number of resolved toggles.
    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    /// Whether no toggles were resolved.
    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(enabled: bool) -> ResolvedToggle {
        ResolvedToggle {
            enabled,
            requires_restart: false,
            source: ResolutionSource::Default,
            pending: None,
        }
    }

    #[test]
    fn test_source_tags() {
        assert_eq!(ResolutionSource::Default.to_string(), "default");
        assert_eq!(
            ResolutionSource::Override("env:GF_FEATURE_TOGGLES".to_string()).to_string(),
            "override-env:GF_FEATURE_TOGGLES"
        );
        assert_eq!(
            ResolutionSource::ConstraintDenied(Constraint::DevMode).to_string(),
            "constraint-denied:dev-mode-required"
        );
    }

    #[test]
    fn test_changed_since() {
        let before = Snapshot::from_toggles(BTreeMap::from([
            ("a".to_string(), toggle(true)),
            ("b".to_string(), toggle(false)),
        ]));
        let after = Snapshot::from_toggles(BTreeMap::from([
            ("a".to_string(), toggle(true)),
            ("b".to_string(), toggle(true)),
        ]));

        assert_eq!(after.changed_since(&before), vec!["b".to_string()]);
        assert!(after.changed_since(&after).is_empty());
        assert_eq!(after.enabled(), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_is_disabled() {
        let snapshot = Snapshot::default();
        assert!(!snapshot.is_enabled("doesNotExist"));
        assert!(snapshot.get("doesNotExist").is_none());
    }

    #[test]
    fn test_serializes_tags() {
        let snapshot = Snapshot::from_toggles(BTreeMap::from([(
            "alpha".to_string(),
            ResolvedToggle {
                enabled: false,
                requires_restart: false,
                source: ResolutionSource::ConstraintDenied(Constraint::License),
                pending: None,
            },
        )]));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"alpha":{"enabled":false,"requires_restart":false,"source":"constraint-denied:license-required"}}"#
        );
    }
}
