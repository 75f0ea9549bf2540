//! Environment variable override source.

use super::file::toggle_list;
use super::{ENV_RANK, OverrideSource};
use crate::error::{Result, ToggleError};
use async_trait::async_trait;
use config::Environment;
use std::collections::HashMap;

/// Prefix used when none is given.
pub const DEFAULT_PREFIX: &str = "GF_FEATURE_TOGGLES";

/// Environment variable override source.
///
/// Reads two comma-separated lists:
///
/// - `<PREFIX>_ENABLE=publicDashboards,storage` forces toggles on
/// - `<PREFIX>_DISABLE=topnav` forces toggles off
///
/// Environment keys are case-folded by the platform conventions, so toggle
/// names travel in the values, where their case survives. A name present in
/// both lists resolves disabled.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::sources::{EnvSource, OverrideSource};
///
/// let source = EnvSource::new("GF_FEATURE_TOGGLES");
/// assert_eq!(source.rank(), 300);
/// ```
pub struct EnvSource {
    prefix: String,
    rank: i32,
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    /// Create a source reading variables with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            rank: ENV_RANK,
            vars: None,
        }
    }

    /// Set the precedence rank for this source.
    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = rank;
        self
    }

    /// Read from a fixed variable map instead of the process environment.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[async_trait]
impl OverrideSource for EnvSource {
    async fn load(&self) -> Result<HashMap<String, config::Value>> {
        let env_source = Environment::with_prefix(&self.prefix).source(self.vars.clone());

        let mut vars = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                ToggleError::LoadError(format!("Failed to load environment variables: {}", e))
            })?
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                ToggleError::ParseError(format!("Failed to parse environment variables: {}", e))
            })?;

        let mut overrides = HashMap::new();
        if let Some(list) = vars.remove("enable") {
            for name in toggle_list(list)? {
                overrides.insert(name, config::Value::from(true));
            }
        }
        if let Some(list) = vars.remove("disable") {
            for name in toggle_list(list)? {
                overrides.insert(name, config::Value::from(false));
            }
        }

        Ok(overrides)
    }

    fn name(&self) -> String {
        format!("env:{}", self.prefix)
    }

    fn rank(&self) -> i32 {
        self.rank
    }
}
