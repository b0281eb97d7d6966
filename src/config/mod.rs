//! Configuration management for `todo_store`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`TODO_*`)
//! 3. Data-directory config (`.todos/config.yaml`)
//! 4. User config (`~/.config/todo/config.yaml`)
//! 5. Defaults
//!
//! The merged layer resolves to a typed [`StoreConfig`].

use crate::error::{Result, TodoError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the per-project data directory.
pub const DATA_DIR_NAME: &str = ".todos";
/// Default database filename inside the data directory.
pub const DEFAULT_DB_FILENAME: &str = "todos.db";
/// Default key-value namespace directory inside the data directory.
pub const DEFAULT_KV_DIRNAME: &str = "kv";
/// Config filename, both per-user and per-data-directory.
pub const CONFIG_FILENAME: &str = "config.yaml";

const ENV_PREFIX: &str = "TODO_";
const DIR_ENV: &str = "TODO_DIR";

/// Which storage backend to use.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Structured store in a `SQLite` file.
    #[default]
    Sqlite,
    /// JSON collection in a key-value directory.
    Flat,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sql" | "structured" => Ok(Self::Sqlite),
            "flat" | "kv" | "json" => Ok(Self::Flat),
            other => Err(TodoError::Config(format!(
                "unknown backend '{other}' (expected sqlite or flat)"
            ))),
        }
    }
}

/// Resolved storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub db_path: PathBuf,
    pub kv_dir: PathBuf,
}

impl StoreConfig {
    /// Default file layout under `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path, backend: Backend) -> Self {
        Self {
            backend,
            db_path: data_dir.join(DEFAULT_DB_FILENAME),
            kv_dir: data_dir.join(DEFAULT_KV_DIRNAME),
        }
    }

    /// Resolve from a merged layer. Relative paths are taken relative to
    /// `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Config`] if the backend value is not recognized.
    pub fn from_layer(layer: &ConfigLayer, data_dir: &Path) -> Result<Self> {
        let backend = match layer.get("backend") {
            Some(value) => value.parse()?,
            None => Backend::default(),
        };

        let db_path = layer.get("db").map_or_else(
            || data_dir.join(DEFAULT_DB_FILENAME),
            |value| resolve_path(data_dir, value),
        );
        let kv_dir = layer.get("kv-dir").map_or_else(
            || data_dir.join(DEFAULT_KV_DIRNAME),
            |value| resolve_path(data_dir, value),
        );

        Ok(Self {
            backend,
            db_path,
            kv_dir,
        })
    }

    /// Load every layer for `data_dir` and resolve.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed, or a value
    /// is invalid.
    pub fn load(data_dir: &Path, cli: &CliOverrides) -> Result<Self> {
        let layer = load_config(data_dir, cli)?;
        Self::from_layer(&layer, data_dir)
    }
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let candidate = PathBuf::from(value.trim());
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}

/// Flat key/value configuration layer. Keys are normalized to lowercase
/// with `-` separators; nested YAML keys are joined with `.`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Value for `key`; blank values count as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from `TODO_*` variables; `TODO_KV_DIR` becomes `kv-dir`.
    /// `TODO_DIR` selects the data directory and is not a layer key.
    #[must_use]
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if key == DIR_ENV {
                continue;
            }
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }
        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub backend: Option<Backend>,
    pub db: Option<PathBuf>,
    pub kv_dir: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(backend) = self.backend {
            layer.insert("backend", backend.as_str());
        }
        if let Some(path) = &self.db {
            layer.insert("db", path.to_string_lossy());
        }
        if let Some(path) = &self.kv_dir {
            layer.insert("kv-dir", path.to_string_lossy());
        }

        layer
    }
}

/// Pick the data directory.
///
/// `explicit` (from `--dir`) wins, then `TODO_DIR`, then the nearest
/// `.todos` directory walking up from the current directory. When none
/// exists, `./.todos` is returned; it is created on first write.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let env_dir = env::var_os(DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let cwd = env::current_dir()?;
    Ok(resolve_data_dir_from(explicit, env_dir.as_deref(), &cwd))
}

fn resolve_data_dir_from(explicit: Option<&Path>, env_dir: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit.or(env_dir) {
        return path.to_path_buf();
    }
    discover_data_dir(cwd).unwrap_or_else(|| cwd.join(DATA_DIR_NAME))
}

/// Nearest existing `.todos` directory at or above `start`.
#[must_use]
pub fn discover_data_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Load data-directory config (`<data_dir>/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(data_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&data_dir.join(CONFIG_FILENAME))
}

/// Load user config (`~/.config/todo/config.yaml`). Without `HOME` there is
/// no user layer.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Some(home) = env::var_os("HOME").filter(|h| !h.is_empty()) else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("todo")
        .join(CONFIG_FILENAME);
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("backend", Backend::default().as_str());
    layer
}

/// Load configuration in precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(data_dir: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        load_project_config(data_dir)?,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    let mut layer = ConfigLayer::default();
    for (key, value) in flat {
        layer.insert(&key, value);
    }
    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
