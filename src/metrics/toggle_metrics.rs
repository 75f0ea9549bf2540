//! Toggle resolution metrics using OpenTelemetry.

use crate::core::Snapshot;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for reloads and published snapshots.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_toggles::metrics::ToggleMetrics;
/// use opentelemetry::global;
///
/// let metrics = ToggleMetrics::new(global::meter("hotswap-toggles"));
///
/// let timer = metrics.start_reload();
/// // ... perform reload ...
/// metrics.record_reload_success(timer);
/// ```
#[derive(Clone)]
pub struct ToggleMetrics {
    reload_attempts: Counter<u64>,
    reload_success: Counter<u64>,
    reload_failures: Counter<u64>,
    reload_timeouts: Counter<u64>,
    reload_duration: Histogram<f64>,
    source_failures: Counter<u64>,
    enabled_toggles: Gauge<i64>,
    pending_restart: Gauge<i64>,
    snapshot_age_seconds: Gauge<i64>,
    last_publish: Arc<parking_lot::Mutex<Instant>>,
}

impl ToggleMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let reload_attempts = meter
            .u64_counter("hotswap_toggles.reload.attempts")
            .with_description("Total number of reload attempts")
            .build();

        let reload_success = meter
            .u64_counter("hotswap_toggles.reload.success")
            .with_description("Number of reloads that published a snapshot")
            .build();

        let reload_failures = meter
            .u64_counter("hotswap_toggles.reload.failures")
            .with_description("Number of reloads that published nothing")
            .build();

        let reload_timeouts = meter
            .u64_counter("hotswap_toggles.reload.timeouts")
            .with_description("Number of reloads aborted by their deadline")
            .build();

        let reload_duration = meter
            .f64_histogram("hotswap_toggles.reload.duration")
            .with_description("Duration of reload operations in seconds")
            .with_unit("s")
            .build();

        let source_failures = meter
            .u64_counter("hotswap_toggles.source.failures")
            .with_description("Number of override source load failures")
            .build();

        let enabled_toggles = meter
            .i64_gauge("hotswap_toggles.toggles.enabled")
            .with_description("Number of enabled toggles in the published snapshot")
            .build();

        let pending_restart = meter
            .i64_gauge("hotswap_toggles.toggles.pending_restart")
            .with_description("Number of restart-required toggles with a deferred change")
            .build();

        let snapshot_age_seconds = meter
            .i64_gauge("hotswap_toggles.snapshot.age")
            .with_description("Time since the last publication in seconds")
            .with_unit("s")
            .build();

        Self {
            reload_attempts,
            reload_success,
            reload_failures,
            reload_timeouts,
            reload_duration,
            source_failures,
            enabled_toggles,
            pending_restart,
            snapshot_age_seconds,
            last_publish: Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Start a reload operation timer.
    pub fn start_reload(&self) -> Instant {
        self.reload_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a reload that published a snapshot.
    pub fn record_reload_success(&self, start: Instant) {
        self.reload_success.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a reload that published nothing.
    pub fn record_reload_failure(&self, start: Instant) {
        self.reload_failures.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a reload aborted by its deadline.
    pub fn record_reload_timeout(&self, start: Instant) {
        self.reload_timeouts.add(1, &[]);
        self.record_reload_failure(start);
    }

    /// Record a source that failed to load.
    pub fn record_source_failure(&self, source: &str) {
        self.source_failures
            .add(1, &[KeyValue::new("source", source.to_string())]);
    }

    /// Record a freshly published snapshot.
    pub fn record_publish(&self, snapshot: &Snapshot) {
        self.enabled_toggles
            .record(snapshot.enabled().len() as i64, &[]);
        self.pending_restart
            .record(snapshot.pending_changes().len() as i64, &[]);
        *self.last_publish.lock() = Instant::now();
    }

    /// Update the snapshot age gauge.
    ///
    /// Call periodically to track how stale the published state is.
    pub fn update_snapshot_age(&self) {
        let age_secs = self.last_publish.lock().elapsed().as_secs() as i64;
        self.snapshot_age_seconds.record(age_secs, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::global;

    #[test]
    fn test_metrics_creation() {
        let metrics = ToggleMetrics::new(global::meter("test"));

        let timer = metrics.start_reload();
        metrics.record_reload_success(timer);

        let timer = metrics.start_reload();
        metrics.record_reload_timeout(timer);

        metrics.record_source_failure("remote:https://flags.example.com");
        metrics.record_publish(&Snapshot::default());
        metrics.update_snapshot_age();
    }

    #[test]
    fn test_metrics_clone() {
        let metrics = ToggleMetrics::new(global::meter("test"));
        let metrics2 = metrics.clone();

        let timer1 = metrics.start_reload();
        let timer2 = metrics2.start_reload();

        metrics.record_reload_success(timer1);
        metrics2.record_reload_failure(timer2);
    }
}
