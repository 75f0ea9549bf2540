//! Toggle resolution engine.

mod builder;
mod constraint;
mod context;
mod layer;
mod manifest;
mod registry;
mod resolver;
mod snapshot;

pub use builder::ResolverRegistryBuilder;
pub use constraint::{ConstraintEvaluator, Eligibility};
pub use context::{CapabilityContext, EvaluationTarget};
pub use layer::OverrideLayer;
pub use manifest::{FrontendManifest, ManifestEntry, ManifestState, ToggleMetadata};
pub use registry::{DEFAULT_LOAD_TIMEOUT, ReloadReport, ResolverRegistry};
pub use resolver::Resolver;
pub use snapshot::{ResolutionSource, ResolvedToggle, Snapshot};
