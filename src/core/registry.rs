//! Process-scoped toggle state with lock-free reads.

use crate::catalog::{Catalog, Maturity};
use crate::core::{
    CapabilityContext, FrontendManifest, OverrideLayer, ResolverRegistryBuilder, Resolver,
    Snapshot, ToggleMetadata,
};
use crate::error::{Result, ToggleError};
use crate::notify::{PollerHandle, SubscriberRegistry, SubscriptionHandle};
use crate::sources::OverrideSource;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
use crate::metrics::ToggleMetrics;

/// Deadline for loading sources at startup unless configured otherwise.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a reload or reconfiguration that published a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Publication counter of the snapshot this call published.
    pub generation: u64,
    /// Toggles whose effective value changed, ordered by name.
    pub changed: Vec<String>,
    /// Restart-required toggles with a deferred change, ordered by name.
    pub pending: Vec<String>,
    /// Sources that failed to load; their last-known-good values were used.
    pub failures: Vec<ToggleError>,
    /// Ignored override entries (unknown names, non-boolean values).
    pub warnings: Vec<ToggleError>,
}

impl ReloadReport {
    /// No source failed and no override was ignored.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

/// Last successfully loaded layer per source, parallel to `sources`.
struct ReloadState {
    layers: Vec<Option<OverrideLayer>>,
}

struct RegistryInner {
    resolver: Resolver,
    sources: Vec<Box<dyn OverrideSource>>,
    current: ArcSwap<Snapshot>,
    context: ArcSwap<CapabilityContext>,
    state: Mutex<ReloadState>,
    generation: AtomicU64,
    initial_report: ReloadReport,
    subscribers: SubscriberRegistry,
    #[cfg(feature = "metrics")]
    metrics: Option<ToggleMetrics>,
}

pub(crate) struct RegistryOptions {
    pub(crate) load_timeout: Duration,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Option<ToggleMetrics>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }
}

/// The published toggle state of a process.
///
/// Holds the current [`Snapshot`] behind an atomically swappable pointer.
/// Reads (`is_enabled`, `current`) are lock-free and never wait on a reload.
/// Reloads are queued behind an async mutex, so at most one runs at a time and
/// snapshots are published in order. A published snapshot is never mutated;
/// superseded ones are freed once the last reader drops its handle.
///
/// Lifecycle: [`init`](Self::init) (or the builder) resolves and publishes the
/// first snapshot; [`reload`](Self::reload) and
/// [`reconfigure`](Self::reconfigure) publish replacements; dropping the last
/// clone tears everything down. Instances are independent, so tests can build
/// as many as they like.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let ops = MemorySource::new("ops", 400);
///
/// let registry = ResolverRegistry::builder()
///     .with_definition(ToggleDefinition::new("storage"))
///     .with_source(ops.clone())
///     .build()
///     .await?;
/// assert!(!registry.is_enabled("storage"));
///
/// ops.set("storage", true);
/// let report = registry.reload(Duration::from_secs(1)).await?;
/// assert_eq!(report.changed, vec!["storage".to_string()]);
/// assert!(registry.is_enabled("storage"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ResolverRegistry {
    inner: Arc<RegistryInner>,
}

impl ResolverRegistry {
    /// Create a builder.
    pub fn builder() -> ResolverRegistryBuilder {
        ResolverRegistryBuilder::new()
    }

    /// Load every source, resolve, and publish the first snapshot.
    ///
    /// A source that fails to load contributes no overrides; startup carries
    /// on without it.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError::DuplicatePrecedence`] if two sources share a rank.
    pub async fn init(
        catalog: Catalog,
        sources: Vec<Box<dyn OverrideSource>>,
        ctx: CapabilityContext,
    ) -> Result<Self> {
        Self::init_with(catalog, sources, ctx, RegistryOptions::default()).await
    }

    pub(crate) async fn init_with(
        catalog: Catalog,
        sources: Vec<Box<dyn OverrideSource>>,
        ctx: CapabilityContext,
        options: RegistryOptions,
    ) -> Result<Self> {
        check_precedence(&sources)?;

        let catalog = Arc::new(catalog);
        let deadline = Instant::now() + options.load_timeout;
        let mut layers = Vec::with_capacity(sources.len());
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        for source in &sources {
            let outcome = match timeout_at(deadline, source.load()).await {
                Ok(result) => result,
                Err(_) => Err(ToggleError::LoadError(format!(
                    "timed out after {:?}",
                    options.load_timeout
                ))),
            };

            match outcome {
                Ok(raw) => {
                    let (layer, layer_warnings) =
                        OverrideLayer::from_raw(source.name(), source.rank(), raw, &catalog);
                    layers.push(Some(layer));
                    warnings.extend(layer_warnings);
                }
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "Override source unavailable at startup");
                    #[cfg(feature = "metrics")]
                    if let Some(metrics) = &options.metrics {
                        metrics.record_source_failure(&source.name());
                    }
                    failures.push(unavailable(source.as_ref(), e));
                    layers.push(None);
                }
            }
        }

        let resolver = Resolver::new(catalog);
        let loaded: Vec<OverrideLayer> = layers.iter().flatten().cloned().collect();
        let snapshot = resolver.resolve(&loaded, &ctx, None);

        let enabled: Vec<String> = snapshot.enabled().into_iter().map(str::to_string).collect();
        log_experimental(resolver.catalog(), &enabled);
        info!(
            toggles = snapshot.len(),
            enabled = enabled.len(),
            unavailable = failures.len(),
            ignored = warnings.len(),
            "Published initial toggle snapshot"
        );

        let initial_report = ReloadReport {
            generation: 1,
            changed: Vec::new(),
            pending: Vec::new(),
            failures,
            warnings,
        };

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &options.metrics {
            metrics.record_publish(&snapshot);
        }

        Ok(Self {
            inner: Arc::new(RegistryInner {
                resolver,
                sources,
                current: ArcSwap::from_pointee(snapshot),
                context: ArcSwap::from_pointee(ctx),
                state: Mutex::new(ReloadState { layers }),
                generation: AtomicU64::new(1),
                initial_report,
                subscribers: SubscriberRegistry::new(),
                #[cfg(feature = "metrics")]
                metrics: options.metrics,
            }),
        })
    }

    /// The currently published snapshot.
    ///
    /// Lock-free. The returned handle stays valid even if a reload publishes
    /// a replacement in the meantime.
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.current.load_full()
    }

    /// Effective value of a toggle. Unknown names are disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.inner.current.load().is_enabled(name)
    }

    /// Catalog data joined with the current resolved state.
    pub fn metadata(&self, name: &str) -> Option<ToggleMetadata> {
        let def = self.catalog().get(name)?;
        Some(ToggleMetadata::new(def, &self.inner.current.load()))
    }

    /// Client-facing projection of the current state.
    pub fn frontend_manifest(&self) -> FrontendManifest {
        FrontendManifest::new(self.catalog(), &self.inner.current.load())
    }

    /// The catalog this registry resolves.
    pub fn catalog(&self) -> &Catalog {
        self.inner.resolver.catalog()
    }

    /// The capability context in effect.
    pub fn context(&self) -> CapabilityContext {
        **self.inner.context.load()
    }

    /// What startup ran into: sources that failed to load and override
    /// entries that were ignored while building the first snapshot.
    pub fn initial_report(&self) -> &ReloadReport {
        &self.inner.initial_report
    }

    /// Number of snapshots published so far, starting at 1 after init.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Re-query every hot-reloadable source and publish a new snapshot.
    ///
    /// Queued behind any reload already in flight. Source loading must finish
    /// within `deadline`; otherwise nothing is published and the previous
    /// snapshot stays in place. A failing source does not block publication:
    /// its last-known-good values are used and the failure is listed in the
    /// report.
    ///
    /// Once this returns, [`current`](Self::current) on the calling task
    /// observes the published snapshot or a newer one.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError::ReloadTimeout`] if loading exceeded `deadline`.
    pub async fn reload(&self, deadline: Duration) -> Result<ReloadReport> {
        let mut state = self.inner.state.lock().await;

        #[cfg(feature = "metrics")]
        let timer = self.inner.metrics.as_ref().map(|m| {
            m.update_snapshot_age();
            m.start_reload()
        });

        let loaded = match timeout(deadline, self.load_hot_sources()).await {
            Ok(loaded) => loaded,
            Err(_) => {
                warn!(deadline = ?deadline, "Reload timed out, keeping previous snapshot");
                #[cfg(feature = "metrics")]
                if let (Some(metrics), Some(timer)) = (&self.inner.metrics, timer) {
                    metrics.record_reload_timeout(timer);
                }
                return Err(ToggleError::ReloadTimeout(deadline));
            }
        };

        let mut failures = Vec::new();
        let mut warnings = Vec::new();
        for (index, outcome) in loaded {
            match outcome {
                Ok((layer, layer_warnings)) => {
                    state.layers[index] = Some(layer);
                    warnings.extend(layer_warnings);
                }
                Err(e) => {
                    let source = &self.inner.sources[index];
                    warn!(source = %source.name(), error = %e, "Override source unavailable, keeping last known good");
                    #[cfg(feature = "metrics")]
                    if let Some(metrics) = &self.inner.metrics {
                        metrics.record_source_failure(&source.name());
                    }
                    failures.push(unavailable(source.as_ref(), e));
                }
            }
        }

        let mut report = self.publish(&state);
        report.failures = failures;
        report.warnings = warnings;
        self.notify(&report).await;

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.inner.metrics, timer) {
            metrics.record_reload_success(timer);
        }

        Ok(report)
    }

    /// Swap the capability context and re-resolve against cached source
    /// values, without any I/O.
    ///
    /// Restart-required toggles keep their values unless a constraint now
    /// denies them.
    pub async fn reconfigure(&self, ctx: CapabilityContext) -> ReloadReport {
        let state = self.inner.state.lock().await;
        self.inner.context.store(Arc::new(ctx));
        debug!(licensed = ctx.licensed, dev_mode = ctx.dev_mode, "Capability context replaced");

        let report = self.publish(&state);
        self.notify(&report).await;
        report
    }

    /// Register a callback invoked with the changed names after every
    /// publication that changed at least one effective value.
    pub async fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback).await
    }

    /// Reload every `period` in a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_poller(&self, period: Duration, deadline: Duration) -> PollerHandle {
        PollerHandle::spawn(self.clone(), period, deadline)
    }

    /// Load hot-reloadable sources, returning outcomes by source index.
    async fn load_hot_sources(
        &self,
    ) -> Vec<(usize, Result<(OverrideLayer, Vec<ToggleError>)>)> {
        let catalog = self.catalog();
        let mut loaded = Vec::new();

        for (index, source) in self.inner.sources.iter().enumerate() {
            if !source.supports_hot_reload() {
                continue;
            }
            let outcome = source
                .load()
                .await
                .map(|raw| OverrideLayer::from_raw(source.name(), source.rank(), raw, catalog));
            loaded.push((index, outcome));
        }

        loaded
    }

    /// Resolve against the cached layers and swap the result in.
    ///
    /// Callers hold the reload lock.
    fn publish(&self, state: &ReloadState) -> ReloadReport {
        let previous = self.inner.current.load_full();
        let ctx = self.context();
        let layers: Vec<OverrideLayer> = state.layers.iter().flatten().cloned().collect();

        let snapshot = self.inner.resolver.resolve(&layers, &ctx, Some(&previous));
        let changed = snapshot.changed_since(&previous);
        let pending: Vec<String> = snapshot
            .pending_changes()
            .into_iter()
            .map(str::to_string)
            .collect();

        let newly_enabled: Vec<String> = changed
            .iter()
            .filter(|name| snapshot.is_enabled(name))
            .cloned()
            .collect();
        log_experimental(self.catalog(), &newly_enabled);

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_publish(&snapshot);
        }

        self.inner.current.store(Arc::new(snapshot));
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;

        info!(
            generation,
            changed = changed.len(),
            pending = pending.len(),
            "Published toggle snapshot"
        );

        ReloadReport {
            generation,
            changed,
            pending,
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    async fn notify(&self, report: &ReloadReport) {
        if !report.changed.is_empty() {
            self.inner.subscribers.notify_all(&report.changed).await;
        }
    }
}

/// Ranks must form a total order across sources.
fn check_precedence(sources: &[Box<dyn OverrideSource>]) -> Result<()> {
    let mut seen: HashMap<i32, String> = HashMap::new();
    for source in sources {
        if let Some(first) = seen.insert(source.rank(), source.name()) {
            return Err(ToggleError::DuplicatePrecedence {
                rank: source.rank(),
                first,
                second: source.name(),
            });
        }
    }
    Ok(())
}

fn unavailable(source: &dyn OverrideSource, error: ToggleError) -> ToggleError {
    ToggleError::SourceUnavailable {
        source_id: source.name(),
        reason: error.to_string(),
    }
}

fn log_experimental(catalog: &Catalog, enabled: &[String]) {
    for name in enabled {
        if catalog
            .get(name)
            .is_some_and(|def| def.maturity() == Maturity::Experimental)
        {
            warn!(toggle = %name, "Experimental toggle is enabled");
        }
    }
}
