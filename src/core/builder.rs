//! Builder for constructing ResolverRegistry instances.

use crate::catalog::{Catalog, ToggleDefinition};
use crate::core::registry::{DEFAULT_LOAD_TIMEOUT, RegistryOptions};
use crate::core::{CapabilityContext, ResolverRegistry};
use crate::error::Result;
use crate::sources::{EnvSource, FILE_RANK, FileSource, OverrideSource};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::metrics::ToggleMetrics;

/// Builder for constructing a [`ResolverRegistry`].
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_toggles::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let registry = ResolverRegistry::builder()
///     .with_catalog(vec![
///         ToggleDefinition::new("topnav").enabled_by_default(),
///         ToggleDefinition::new("publicDashboardsEmailSharing").requires_license(),
///     ])
///     .with_file("conf/defaults.toml")
///     .with_file("conf/custom.toml")
///     .with_env_overrides("GF_FEATURE_TOGGLES")
///     .with_context(CapabilityContext::backend().with_license(true))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ResolverRegistryBuilder {
    definitions: Vec<ToggleDefinition>,
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    custom_sources: Vec<Box<dyn OverrideSource>>,
    context: CapabilityContext,
    load_timeout: Duration,
    #[cfg(feature = "metrics")]
    metrics: Option<ToggleMetrics>,
}

impl ResolverRegistryBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            file_paths: Vec::new(),
            env_prefix: None,
            custom_sources: Vec::new(),
            context: CapabilityContext::default(),
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Append definitions to the catalog, keeping their order.
    pub fn with_catalog(mut self, definitions: impl IntoIterator<Item = ToggleDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Append one definition to the catalog.
    pub fn with_definition(mut self, definition: ToggleDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add a static configuration file.
    ///
    /// Files added later rank higher: 100, 110, 120, and so on.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Read `<PREFIX>_ENABLE` / `<PREFIX>_DISABLE` from the environment
    /// (rank 300).
    pub fn with_env_overrides(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Add any override source.
    pub fn with_source<S: OverrideSource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Set the capability context. Defaults to unlicensed backend production.
    pub fn with_context(mut self, context: CapabilityContext) -> Self {
        self.context = context;
        self
    }

    /// Deadline for loading all sources at startup. Default is 10 seconds.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Record OpenTelemetry metrics through `meter`.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(ToggleMetrics::new(meter));
        self
    }

    /// Validate the catalog, load every source and publish the first snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Two definitions share a name
    /// - Two sources share a precedence rank
    pub async fn build(self) -> Result<ResolverRegistry> {
        let catalog = Catalog::new(self.definitions)?;

        let mut sources: Vec<Box<dyn OverrideSource>> = Vec::new();

        for (index, path) in self.file_paths.into_iter().enumerate() {
            let rank = FILE_RANK + (index as i32 * 10);
            sources.push(Box::new(FileSource::new(path).with_rank(rank)));
        }

        sources.extend(self.custom_sources);

        if let Some(prefix) = self.env_prefix {
            sources.push(Box::new(EnvSource::new(prefix)));
        }

        let options = RegistryOptions {
            load_timeout: self.load_timeout,
            #[cfg(feature = "metrics")]
            metrics: self.metrics,
        };

        ResolverRegistry::init_with(catalog, sources, self.context, options).await
    }
}

impl Default for ResolverRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
