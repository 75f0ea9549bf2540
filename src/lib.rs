//! # hotswap-toggles
//!
//! Feature-toggle resolution with constraint gating, layered overrides, and
//! lock-free snapshot reads.
//!
//! ## Overview
//!
//! A process declares a fixed catalog of toggles. Each toggle has a default,
//! a maturity, and optional constraints (license, development mode,
//! frontend-only). Override sources (configuration files, environment
//! variables, a [`RemoteSource`](sources::RemoteSource) wrapping your flag
//! service client, or your own) supply
//! runtime values with a precedence rank. The resolver merges all of it into
//! an immutable [`Snapshot`](core::Snapshot), and a
//! [`ResolverRegistry`](core::ResolverRegistry) publishes that snapshot through `arc-swap` so request paths can read it
//! without taking a lock.
//!
//! Constraints always win: an override can never enable a toggle whose
//! license or development-mode requirement is unmet. Restart-required toggles
//! keep the value they had when the process first resolved them; later changes
//! are recorded as pending.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_toggles::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<()> {
//! let registry = ResolverRegistry::builder()
//!     .with_catalog(vec![
//!         ToggleDefinition::new("topnav").enabled_by_default(),
//!         ToggleDefinition::new("storage").with_maturity(Maturity::Experimental),
//!         ToggleDefinition::new("useCachingService").requires_restart(),
//!     ])
//!     .with_file("conf/custom.toml")
//!     .with_env_overrides("GF_FEATURE_TOGGLES")
//!     .build()
//!     .await?;
//!
//! // Lock-free reads
//! if registry.is_enabled("topnav") {
//!     println!("new navigation");
//! }
//!
//! // Pick up changes from hot-reloadable sources
//! let report = registry.reload(Duration::from_secs(5)).await?;
//! println!("changed: {:?}", report.changed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics`: OpenTelemetry instruments for reloads and snapshots

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod core;
pub mod error;
pub mod notify;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::catalog::{Catalog, Constraint, Maturity, ToggleDefinition};
    pub use crate::core::{
        CapabilityContext, EvaluationTarget, ReloadReport, ResolutionSource, ResolverRegistry,
        ResolverRegistryBuilder, Snapshot,
    };
    pub use crate::error::{Result, ToggleError};
    pub use crate::sources::{
        EnvSource, FileSource, FlagServiceClient, MemorySource, OverrideSource, RemoteSource,
    };
}
