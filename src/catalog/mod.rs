//! The immutable set of toggle definitions known to a process.

mod definition;

pub use definition::{Constraint, Maturity, ToggleDefinition};

use crate::error::{Result, ToggleError};
use std::collections::HashMap;

/// Validated, ordered catalog of toggle definitions.
///
/// Built once at startup. Names are unique; construction fails fast on the
/// first duplicate.
///
/// Configuration transports fold keys to lowercase, so override keys are
/// matched with [`resolve_name`](Self::resolve_name), which falls back to a
/// case-insensitive lookup when there is no exact match.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::catalog::{Catalog, ToggleDefinition};
///
/// let catalog = Catalog::new(vec![
///     ToggleDefinition::new("topnav").enabled_by_default(),
///     ToggleDefinition::new("storage"),
/// ])
/// .unwrap();
///
/// assert_eq!(catalog.len(), 2);
/// assert!(catalog.contains("topnav"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: Vec<ToggleDefinition>,
    index: HashMap<String, usize>,
    /// Lowercased name to position; `None` when two names fold together.
    folded: HashMap<String, Option<usize>>,
}

impl Catalog {
    /// Validate and index a sequence of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError::DuplicateDefinition`] if two entries share a name.
    pub fn new(definitions: impl IntoIterator<Item = ToggleDefinition>) -> Result<Self> {
        let definitions: Vec<_> = definitions.into_iter().collect();
        let mut index = HashMap::with_capacity(definitions.len());
        let mut folded = HashMap::with_capacity(definitions.len());

        for (position, def) in definitions.iter().enumerate() {
            if index.insert(def.name().to_string(), position).is_some() {
                return Err(ToggleError::DuplicateDefinition {
                    name: def.name().to_string(),
                });
            }
            folded
                .entry(def.name().to_lowercase())
                .and_modify(|slot| *slot = None)
                .or_insert(Some(position));
        }

        Ok(Self {
            definitions,
            index,
            folded,
        })
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&ToggleDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    /// Whether a toggle with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Canonical name for an override key.
    ///
    /// Exact matches win. Otherwise the key is compared without regard to
    /// case; names that differ only in case are never matched that way.
    pub fn resolve_name(&self, key: &str) -> Option<&str> {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => (*self.folded.get(&key.to_lowercase())?)?,
        };
        Some(self.definitions[position].name())
    }

    /// Definitions in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &ToggleDefinition> {
        self.definitions.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
