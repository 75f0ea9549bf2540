//! Read-only projections for admin display and client delivery.

use crate::catalog::{Catalog, Maturity, ToggleDefinition};
use crate::core::{ResolutionSource, Snapshot};
use serde::Serialize;

/// Informational view of one toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleMetadata {
    /// Toggle name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Maturity.
    pub maturity: Maturity,
    /// Owning team.
    pub owner: String,
    /// Changes are deferred until restart.
    pub requires_restart: bool,
    /// No backend effect.
    pub frontend_only: bool,
    /// Current effective value.
    pub enabled: bool,
    /// Origin of the current value.
    pub source: ResolutionSource,
    /// Deferred value for restart-required toggles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
}

impl ToggleMetadata {
    pub(crate) fn new(def: &ToggleDefinition, snapshot: &Snapshot) -> Self {
        let resolved = snapshot.get(def.name());
        Self {
            name: def.name().to_string(),
            description: def.description().to_string(),
            maturity: def.maturity(),
            owner: def.owner().to_string(),
            requires_restart: def.is_restart_required(),
            frontend_only: def.is_frontend_only(),
            enabled: resolved.is_some_and(|t| t.enabled),
            source: resolved.map_or(ResolutionSource::Default, |t| t.source.clone()),
            pending: resolved.and_then(|t| t.pending),
        }
    }
}

/// Client-facing state of one toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ManifestState {
    /// Value resolved by the backend.
    Resolved {
        /// Effective value.
        enabled: bool,
    },
    /// Frontend-only toggle; the client decides.
    Unresolved {
        /// The static default expression.
        default: bool,
    },
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Toggle name.
    pub name: String,
    /// Client-facing state.
    #[serde(flatten)]
    pub state: ManifestState,
}

/// Projection of toggle state for an external client-delivery collaborator.
///
/// Frontend-only toggles are not evaluated here: they appear as
/// [`ManifestState::Unresolved`] with their default attached. Every other
/// toggle carries its backend value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontendManifest {
    /// Entries in catalog order.
    pub toggles: Vec<ManifestEntry>,
}

impl FrontendManifest {
    pub(crate) fn new(catalog: &Catalog, snapshot: &Snapshot) -> Self {
        let toggles = catalog
            .iter()
            .map(|def| {
                let state = if def.is_frontend_only() {
                    ManifestState::Unresolved {
                        default: def.default_enabled(),
                    }
                } else {
                    ManifestState::Resolved {
                        enabled: snapshot.is_enabled(def.name()),
                    }
                };
                ManifestEntry {
                    name: def.name().to_string(),
                    state,
                }
            })
            .collect();

        Self { toggles }
    }

    /// State of one entry.
    pub fn get(&self, name: &str) -> Option<ManifestState> {
        self.toggles.iter().find(|e| e.name == name).map(|e| e.state)
    }

    /// Serialize to JSON for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::error::ToggleError::Other(format!("Failed to serialize manifest: {}", e)))
    }
}
