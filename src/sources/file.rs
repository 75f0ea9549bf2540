//! File-based override source.

use super::{FILE_RANK, OverrideSource};
use crate::error::{Result, ToggleError};
use async_trait::async_trait;
use config::{File, ValueKind};
use std::collections::HashMap;
use std::path::PathBuf;

/// Section holding toggle overrides unless configured otherwise.
pub const DEFAULT_SECTION: &str = "feature_toggles";

/// Key whose value lists toggles to enable.
const ENABLE_KEY: &str = "enable";

/// Operator configuration file source.
///
/// Reads YAML, TOML, or JSON (detected from the extension) and takes the
/// overrides from one section:
///
/// ```toml
/// [feature_toggles]
/// enable = "publicDashboards,storage"
/// lokiLive = false
/// ```
///
/// `enable` is a comma-separated string or a list of names that resolve to
/// `true`; every other key is a single override. A file without the section
/// yields no overrides.
///
/// Keys come back lowercased by the `config` crate; names listed under
/// `enable` keep their case. Layers match both against the catalog without
/// regard to case.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_toggles::sources::FileSource;
///
/// let source = FileSource::new("conf/custom.toml");
/// ```
pub struct FileSource {
    path: PathBuf,
    section: String,
    rank: i32,
    hot_reload: bool,
}

impl FileSource {
    /// Create a static file source with the default section and rank.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            section: DEFAULT_SECTION.to_string(),
            rank: FILE_RANK,
            hot_reload: false,
        }
    }

    /// Read overrides from a different section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    /// Set the precedence rank for this source.
    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = rank;
        self
    }

    /// Re-read the file on every reload instead of only at startup.
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload = enabled;
        self
    }

    /// Validate that the file extension is supported.
    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ToggleError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" | "toml" | "json" => Ok(()),
            _ => Err(ToggleError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                extension
            ))),
        }
    }
}

#[async_trait]
impl OverrideSource for FileSource {
    async fn load(&self) -> Result<HashMap<String, config::Value>> {
        self.validate_extension()?;

        if !self.path.exists() {
            return Err(ToggleError::LoadError(format!(
                "Override file not found: {}",
                self.path.display()
            )));
        }

        let document = config::Config::builder()
            .add_source(File::from(self.path.clone()).required(true))
            .build()
            .map_err(|e| ToggleError::LoadError(format!("Failed to load file: {}", e)))?;

        let mut root = document
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| ToggleError::ParseError(format!("Failed to parse file: {}", e)))?;

        let Some(section) = root.remove(&self.section) else {
            return Ok(HashMap::new());
        };

        let table = section.into_table().map_err(|e| {
            ToggleError::ParseError(format!("Section [{}] is not a table: {}", self.section, e))
        })?;

        expand_overrides(table.into_iter().collect())
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn rank(&self) -> i32 {
        self.rank
    }

    fn supports_hot_reload(&self) -> bool {
        self.hot_reload
    }
}

/// Replace the `enable` list with one `true` entry per listed name.
///
/// Explicit per-toggle keys win over the list.
fn expand_overrides(
    mut table: HashMap<String, config::Value>,
) -> Result<HashMap<String, config::Value>> {
    let mut overrides = HashMap::new();

    if let Some(list) = table.remove(ENABLE_KEY) {
        for name in toggle_list(list)? {
            overrides.insert(name, config::Value::from(true));
        }
    }

    overrides.extend(table);
    Ok(overrides)
}

/// Parse a comma-separated string or an array into toggle names.
pub(super) fn toggle_list(value: config::Value) -> Result<Vec<String>> {
    let names = match value.kind {
        ValueKind::Array(items) => items
            .into_iter()
            .map(|item| item.into_string())
            .collect::<std::result::Result<Vec<_>, _>>()?,
        ValueKind::Nil => Vec::new(),
        other => config::Value::new(None, other)
            .into_string()?
            .split(',')
            .map(str::to_string)
            .collect(),
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_extension() {
        assert!(FileSource::new("toggles.yaml").validate_extension().is_ok());
        assert!(FileSource::new("toggles.yml").validate_extension().is_ok());
        assert!(FileSource::new("toggles.toml").validate_extension().is_ok());
        assert!(FileSource::new("toggles.json").validate_extension().is_ok());
        assert!(FileSource::new("toggles.ini").validate_extension().is_err());
    }

    #[tokio::test]
    async fn test_load_toml_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");

        fs::write(
            &path,
            r#"
[server]
http_port = 3000

[feature_toggles]
enable = "publicDashboards, storage"
lokiLive = false
"#,
        )
        .unwrap();

        let overrides = FileSource::new(&path).load().await.unwrap();
        assert_eq!(overrides.len(), 3);
        assert!(overrides["publicDashboards"].clone().into_bool().unwrap());
        assert!(overrides["storage"].clone().into_bool().unwrap());
        let (_, loki) = overrides
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("lokiLive"))
            .unwrap();
        assert!(!loki.clone().into_bool().unwrap());
    }

    #[tokio::test]
    async fn test_load_yaml_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.yaml");

        fs::write(
            &path,
            r#"
feature_toggles:
  enable:
    - scenes
    - topnav
"#,
        )
        .unwrap();

        let overrides = FileSource::new(&path).load().await.unwrap();
        assert_eq!(overrides.len(), 2);
        assert!(overrides.contains_key("scenes"));
        assert!(overrides.contains_key("topnav"));
    }

    #[tokio::test]
    async fn test_missing_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[server]\nhttp_port = 3000\n").unwrap();

        let overrides = FileSource::new(&path).load().await.unwrap();
        assert!(overrides.is_empty());
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let source = FileSource::new("/nonexistent/custom.toml");
        assert!(source.load().await.is_err());
    }

    #[test]
    fn test_defaults() {
        let source = FileSource::new("custom.toml");
        assert_eq!(source.rank(), FILE_RANK);
        assert!(!source.supports_hot_reload());
        assert!(source.name().contains("custom.toml"));

        let source = source.with_rank(150).with_hot_reload(true);
        assert_eq!(source.rank(), 150);
        assert!(source.supports_hot_reload());
    }
}
