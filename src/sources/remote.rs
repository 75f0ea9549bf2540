//! Remote flag service source.
//!
//! The crate ships no network transport. Callers bring their own client
//! (HTTP, gRPC, a vendor SDK) by implementing [`FlagServiceClient`], and
//! [`RemoteSource`] plugs it into the registry with remote precedence and
//! hot reload.

use super::{OverrideSource, REMOTE_RANK};
use crate::error::{Result, ToggleError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Client for a remote flag service.
///
/// `fetch` returns the full set of overrides the service currently holds.
/// Any error is reported by the registry as the source being unavailable,
/// and the last values fetched successfully stay in effect.
#[async_trait]
pub trait FlagServiceClient: Send + Sync {
    /// Fetch raw override values keyed by toggle name.
    async fn fetch(&self) -> Result<HashMap<String, config::Value>>;

    /// Where the client fetches from, used in the source name.
    fn endpoint(&self) -> String;
}

/// Override source backed by a [`FlagServiceClient`].
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use hotswap_toggles::prelude::*;
/// use hotswap_toggles::sources::json_to_overrides;
/// use std::collections::HashMap;
///
/// struct Canned;
///
/// #[async_trait]
/// impl FlagServiceClient for Canned {
///     async fn fetch(&self) -> Result<HashMap<String, config::Value>> {
///         json_to_overrides(serde_json::json!({ "storage": true }))
///     }
///
///     fn endpoint(&self) -> String {
///         "flags.internal".to_string()
///     }
/// }
///
/// let source = RemoteSource::new(Canned);
/// assert_eq!(source.name(), "remote:flags.internal");
/// assert_eq!(source.rank(), 250);
/// assert!(source.supports_hot_reload());
/// ```
pub struct RemoteSource<C> {
    client: C,
    rank: i32,
}

impl<C: FlagServiceClient> RemoteSource<C> {
    /// Wrap a client at the conventional remote rank.
    pub fn new(client: C) -> Self {
        Self {
            client,
            rank: REMOTE_RANK,
        }
    }

    /// Override the precedence rank.
    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = rank;
        self
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: FlagServiceClient> OverrideSource for RemoteSource<C> {
    async fn load(&self) -> Result<HashMap<String, config::Value>> {
        self.client.fetch().await
    }

    fn name(&self) -> String {
        format!("remote:{}", self.client.endpoint())
    }

    fn rank(&self) -> i32 {
        self.rank
    }

    fn supports_hot_reload(&self) -> bool {
        true
    }
}

/// Convert a JSON object payload into raw override values.
///
/// # Errors
///
/// Returns [`ToggleError::ParseError`] if the payload is not an object.
pub fn json_to_overrides(json: JsonValue) -> Result<HashMap<String, config::Value>> {
    match json {
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(key, value)| Ok((key, json_value_to_config_value(value)?)))
            .collect(),
        other => Err(ToggleError::ParseError(format!(
            "expected a JSON object of overrides, got {}",
            other
        ))),
    }
}

fn json_value_to_config_value(value: JsonValue) -> Result<config::Value> {
    let kind = match value {
        JsonValue::Null => config::ValueKind::Nil,
        JsonValue::Bool(b) => config::ValueKind::Boolean(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                config::ValueKind::I64(i)
            } else if let Some(f) = n.as_f64() {
                config::ValueKind::Float(f)
            } else {
                return Err(ToggleError::ParseError(format!(
                    "unsupported number: {}",
                    n
                )));
            }
        }
        JsonValue::String(s) => config::ValueKind::String(s),
        JsonValue::Array(arr) => config::ValueKind::Array(
            arr.into_iter()
                .map(json_value_to_config_value)
                .collect::<Result<_>>()?,
        ),
        JsonValue::Object(map) => config::ValueKind::Table(
            map.into_iter()
                .map(|(key, val)| Ok((key, json_value_to_config_value(val)?)))
                .collect::<Result<_>>()?,
        ),
    };
    Ok(config::Value::new(None, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<Result<HashMap<String, config::Value>>>>,
    }

    #[async_trait]
    impl FlagServiceClient for Scripted {
        async fn fetch(&self) -> Result<HashMap<String, config::Value>> {
            self.replies.lock().unwrap().remove(0)
        }

        fn endpoint(&self) -> String {
            "flags.example.net".to_string()
        }
    }

    #[test]
    fn test_defaults() {
        let source = RemoteSource::new(Scripted {
            replies: Mutex::new(Vec::new()),
        });
        assert_eq!(source.rank(), REMOTE_RANK);
        assert!(source.supports_hot_reload());
        assert_eq!(source.name(), "remote:flags.example.net");

        let source = source.with_rank(275);
        assert_eq!(source.rank(), 275);
    }

    #[tokio::test]
    async fn test_load_passes_client_result_through() {
        let source = RemoteSource::new(Scripted {
            replies: Mutex::new(vec![
                json_to_overrides(json!({ "lokiLive": true })),
                Err(ToggleError::LoadError("503 Service Unavailable".to_string())),
            ]),
        });

        let loaded = source.load().await.unwrap();
        assert!(loaded["lokiLive"].clone().into_bool().unwrap());

        let err = source.load().await.unwrap_err();
        assert_eq!(
            err,
            ToggleError::LoadError("503 Service Unavailable".to_string())
        );
    }

    #[test]
    fn test_json_to_overrides() {
        let overrides = json_to_overrides(json!({
            "storage": true,
            "scenes": "false",
            "topnav": 1,
            "nested": { "a": [1, 2.5, null] }
        }))
        .unwrap();

        assert_eq!(overrides.len(), 4);
        assert!(overrides["storage"].clone().into_bool().unwrap());
        assert!(!overrides["scenes"].clone().into_bool().unwrap());
        assert!(overrides["topnav"].clone().into_bool().unwrap());
        assert!(overrides["nested"].clone().into_bool().is_err());
    }

    #[test]
    fn test_json_root_must_be_object() {
        assert!(matches!(
            json_to_overrides(json!(["storage"])),
            Err(ToggleError::ParseError(_))
        ));
    }
}
