//! Periodic reloads for hot-reloadable sources.

use crate::core::ResolverRegistry;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

/// Handle to a background polling task. Dropping it stops the task.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_toggles::prelude::*;
/// use std::time::Duration;
///
/// # async fn example(registry: ResolverRegistry) {
/// let poller = registry.spawn_poller(Duration::from_secs(30), Duration::from_secs(5));
/// // ... serve traffic ...
/// drop(poller);
/// # }
/// ```
pub struct PollerHandle {
    task: JoinHandle<()>,
    period: Duration,
}

impl PollerHandle {
    pub(crate) fn spawn(registry: ResolverRegistry, period: Duration, deadline: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; init already resolved.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match registry.reload(deadline).await {
                    Ok(report) => debug!(
                        generation = report.generation,
                        changed = report.changed.len(),
                        "Polled reload complete"
                    ),
                    Err(e) => warn!(error = %e, "Polled reload failed"),
                }
            }
        });

        Self { task, period }
    }

    /// Time between reloads.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop polling. A reload already in flight is cancelled before it
    /// publishes.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use std::time::Duration;

    async fn registry(ops: &MemorySource) -> ResolverRegistry {
        ResolverRegistry::builder()
            .with_definition(ToggleDefinition::new("storage"))
            .with_source(ops.clone())
            .build()
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_reloads_each_period() {
        let ops = MemorySource::new("ops", 400);
        let registry = registry(&ops).await;
        let poller = registry.spawn_poller(Duration::from_secs(10), Duration::from_secs(1));
        assert_eq!(poller.period(), Duration::from_secs(10));
        assert!(poller.is_running());

        ops.set("storage", true);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(registry.is_enabled("storage"));
        assert_eq!(registry.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_polling() {
        let ops = MemorySource::new("ops", 400);
        let registry = registry(&ops).await;
        let poller = registry.spawn_poller(Duration::from_secs(10), Duration::from_secs(1));

        poller.stop();
        ops.set("storage", true);
        tokio::time::sleep(Duration::from_secs(35)).await;

        assert!(!registry.is_enabled("storage"));
        assert_eq!(registry.generation(), 1);
    }
}
