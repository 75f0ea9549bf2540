//! Built-in metrics for toggle resolution.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Reload attempts/success/failures/timeouts
//! - Reload duration
//! - Override source failures
//! - Enabled and restart-pending toggle counts
//! - Snapshot age
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_toggles::prelude::*;
//! use opentelemetry::global;
//!
//! # async fn example(definitions: Vec<ToggleDefinition>) -> Result<()> {
//! let registry = ResolverRegistry::builder()
//!     .with_catalog(definitions)
//!     .with_metrics(global::meter("my-app"))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod toggle_metrics;

pub use toggle_metrics::ToggleMetrics;
