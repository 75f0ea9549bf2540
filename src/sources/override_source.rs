//! Override source trait.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Default rank for static configuration files.
pub const FILE_RANK: i32 = 100;

/// Conventional rank for a remote flag service client.
pub const REMOTE_RANK: i32 = 250;

/// Default rank for environment variables.
pub const ENV_RANK: i32 = 300;

/// Trait for override sources.
///
/// Implement this trait to feed toggle values from anywhere (files,
/// environment, a remote flag service, an admin API). Sources never see each
/// other; the resolver is the only component that merges them.
///
/// Values are raw: the resolver coerces them to booleans and rejects anything
/// that does not coerce.
#[async_trait]
pub trait OverrideSource: Send + Sync {
    /// Load raw override values keyed by toggle name.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be reached or parsed. The registry
    /// treats that as the source being unavailable for this cycle.
    async fn load(&self) -> Result<HashMap<String, config::Value>>;

    /// Stable identifier for this source, used in resolution tags and logs.
    fn name(&self) -> String;

    /// Precedence rank (higher wins). Ranks must be unique within a registry.
    ///
    /// Default ranks:
    /// - Environment variables: 300
    /// - Remote flag service: 250
    /// - Configuration files: 100
    fn rank(&self) -> i32 {
        FILE_RANK
    }

    /// Whether the source is re-queried on every reload.
    ///
    /// Sources returning `false` are loaded once at startup.
    fn supports_hot_reload(&self) -> bool {
        false
    }
}
