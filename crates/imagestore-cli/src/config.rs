//! CLI configuration management.

use imagestore_core::{Error, Result};
use imagestore_provider::DEFAULT_EXTENSIONS;
use imagestore_s3::S3ClientOptions;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").expect("valid env reference pattern")
});

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Containers serving source images.
    #[serde(default)]
    pub containers: Vec<ContainerSettings>,
    /// Container holding processed images.
    pub cache: Option<CacheSettings>,
    /// Deadline for each store round-trip, in milliseconds.
    #[serde(default)]
    pub operation_timeout_ms: Option<u64>,
    /// Recognized image extensions.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

/// One source container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSettings {
    #[serde(alias = "bucket_name")]
    pub name: String,
    #[serde(flatten)]
    pub client: S3ClientOptions,
}

/// The cache container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(alias = "name")]
    pub bucket_name: String,
    #[serde(flatten)]
    pub client: S3ClientOptions,
}

fn default_formats() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            containers: vec![],
            cache: None,
            operation_timeout_ms: None,
            formats: default_formats(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// A missing file at the default location yields default settings; a
    /// missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load settings from a YAML file, expanding `${VAR}` references.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse YAML, then expand `${VAR}` references inside string values.
    ///
    /// Expansion happens after parsing, so a value is used verbatim even when
    /// it contains YAML syntax, and references in comments are ignored.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(contents).map_err(invalid)?;
        if value.is_null() {
            return Ok(Self::default());
        }

        let mut missing = Vec::new();
        expand_value(&mut value, &mut missing);
        check_missing(missing)?;

        serde_yaml::from_value(value).map_err(invalid)
    }

    /// Default configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "imagestore", "imagestore")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }
}

fn expand_value(value: &mut Value, missing: &mut Vec<String>) {
    match value {
        Value::String(text) => *text = expand_str(text, missing),
        Value::Sequence(items) => {
            for item in items {
                expand_value(item, missing);
            }
        }
        Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                expand_value(item, missing);
            }
        }
        Value::Tagged(tagged) => expand_value(&mut tagged.value, missing),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Replace `${VAR}` references with values from the environment, recording
/// unset names in `missing`.
fn expand_str(input: &str, missing: &mut Vec<String>) -> String {
    ENV_REFERENCE
        .replace_all(input, |caps: &Captures| {
            let name = &caps[1];
            std::env::var(name).unwrap_or_else(|_| {
                missing.push(name.to_string());
                String::new()
            })
        })
        .into_owned()
}

fn check_missing(mut missing: Vec<String>) -> Result<()> {
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    missing.dedup();
    Err(Error::Config(format!(
        "Undefined environment variables: {}",
        missing.join(", ")
    )))
}

fn invalid(err: serde_yaml::Error) -> Error {
    Error::Config(format!("Invalid configuration: {}", err))
}
