//! In-memory override source.

use super::OverrideSource;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Programmatic, shared override source.
///
/// Cloning yields a handle to the same map, so an admin path can keep one
/// clone and call [`MemorySource::set`] while the registry owns another.
/// Changes become visible on the next reload.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::sources::{MemorySource, OverrideSource};
///
/// let admin = MemorySource::new("admin", 400);
/// admin.set("storage", true);
/// assert_eq!(admin.rank(), 400);
/// ```
#[derive(Clone)]
pub struct MemorySource {
    name: String,
    rank: i32,
    hot_reload: bool,
    values: Arc<RwLock<HashMap<String, config::Value>>>,
}

impl MemorySource {
    /// Create an empty, hot-reloadable source.
    pub fn new(name: impl Into<String>, rank: i32) -> Self {
        Self {
            name: name.into(),
            rank,
            hot_reload: true,
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load once at startup only.
    pub fn static_only(mut self) -> Self {
        self.hot_reload = false;
        self
    }

    /// Builder-style variant of [`MemorySource::set`].
    pub fn with_value(self, toggle: &str, value: impl Into<config::Value>) -> Self {
        self.set(toggle, value);
        self
    }

    /// Set a raw override value.
    pub fn set(&self, toggle: &str, value: impl Into<config::Value>) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(toggle.to_string(), value.into());
    }

    /// Remove an override.
    pub fn remove(&self, toggle: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(toggle);
    }

    /// Remove every override.
    pub fn clear(&self) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.clear();
    }
}

#[async_trait]
impl OverrideSource for MemorySource {
    async fn load(&self) -> Result<HashMap<String, config::Value>> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.clone())
    }

    fn name(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn rank(&self) -> i32 {
        self.rank
    }

    fn supports_hot_reload(&self) -> bool {
        self.hot_reload
    }
}
