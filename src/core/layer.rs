//! Validated override values from one source.

use crate::catalog::Catalog;
use crate::error::ToggleError;
use std::collections::HashMap;
use tracing::warn;

/// Boolean overrides from one source, restricted to catalog names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideLayer {
    source_id: String,
    rank: i32,
    values: HashMap<String, bool>,
}

impl OverrideLayer {
    /// Create an empty layer.
    pub fn new(source_id: impl Into<String>, rank: i32) -> Self {
        Self {
            source_id: source_id.into(),
            rank,
            values: HashMap::new(),
        }
    }

    /// Builder-style insert, mostly for tests and programmatic layers.
    pub fn with_value(mut self, toggle: impl Into<String>, enabled: bool) -> Self {
        self.values.insert(toggle.into(), enabled);
        self
    }

    /// Validate raw values against the catalog.
    ///
    /// Keys are matched to catalog names without regard to case and stored
    /// under the canonical name; an exact key wins over a case-folded one.
    /// Keys absent from the catalog and values that do not coerce to a
    /// boolean are dropped; each is logged and returned as a warning.
    pub fn from_raw(
        source_id: impl Into<String>,
        rank: i32,
        raw: HashMap<String, config::Value>,
        catalog: &Catalog,
    ) -> (Self, Vec<ToggleError>) {
        let mut layer = Self::new(source_id, rank);
        let mut warnings = Vec::new();

        for (key, value) in raw {
            let Some(name) = catalog.resolve_name(&key) else {
                warn!(source = %layer.source_id, toggle = %key, "Ignoring override for unknown toggle");
                warnings.push(ToggleError::UnknownOverrideKey {
                    source_id: layer.source_id.clone(),
                    key,
                });
                continue;
            };

            match value.into_bool() {
                Ok(enabled) if name == key => {
                    layer.values.insert(key, enabled);
                }
                Ok(enabled) => {
                    layer.values.entry(name.to_string()).or_insert(enabled);
                }
                Err(e) => {
                    warn!(source = %layer.source_id, toggle = %key, error = %e, "Ignoring invalid override value");
                    warnings.push(ToggleError::InvalidOverrideValue {
                        source_id: layer.source_id.clone(),
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Stable order regardless of map iteration.
        warnings.sort_by_key(|w| w.to_string());
        (layer, warnings)
    }

    /// Name of the originating source.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Precedence rank (higher wins).
    pub fn rank(&self) -> i32 {
        self.rank
    }

    /// The override for `toggle`, if this layer has one.
    pub fn get(&self, toggle: &str) -> Option<bool> {
        self.values.get(toggle).copied()
    }

    /// Number of overrides in the layer.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the layer holds no overrides.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToggleDefinition;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            ToggleDefinition::new("storage"),
            ToggleDefinition::new("topnav"),
            ToggleDefinition::new("scenes"),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_raw_filters() {
        let raw = HashMap::from([
            ("storage".to_string(), config::Value::from(true)),
            ("topnav".to_string(), config::Value::from("off")),
            ("scenes".to_string(), config::Value::from("maybe")),
            ("ghost".to_string(), config::Value::from(true)),
        ]);

        let (layer, warnings) = OverrideLayer::from_raw("memory:test", 10, raw, &catalog());

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.get("storage"), Some(true));
        assert_eq!(layer.get("topnav"), Some(false));
        assert_eq!(layer.get("scenes"), None);
        assert_eq!(layer.get("ghost"), None);

        assert_eq!(warnings.len(), 2);
        assert!(warnings.contains(&ToggleError::UnknownOverrideKey {
            source_id: "memory:test".to_string(),
            key: "ghost".to_string(),
        }));
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ToggleError::InvalidOverrideValue { key, .. } if key == "scenes"))
        );
    }

    #[test]
    fn test_from_raw_folded_keys() {
        let catalog = Catalog::new(vec![
            ToggleDefinition::new("lokiLive"),
            ToggleDefinition::new("publicDashboards"),
        ])
        .unwrap();

        let raw = HashMap::from([
            ("lokilive".to_string(), config::Value::from(true)),
            ("publicdashboards".to_string(), config::Value::from(true)),
            ("publicDashboards".to_string(), config::Value::from(false)),
        ]);

        let (layer, warnings) = OverrideLayer::from_raw("file:custom.toml", 100, raw, &catalog);

        assert!(warnings.is_empty());
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.get("lokiLive"), Some(true));
        assert_eq!(layer.get("lokilive"), None);
        assert_eq!(layer.get("publicDashboards"), Some(false));
    }
}
