//! File-based config discovery for CLI use
//!
//! Handles finding and loading weft configuration files from the filesystem,
//! then layering `WEFT_` environment overrides on top.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::Env;
use serde_json::{Map, Value};

use crate::config::WeftConfig;
use crate::error::{ConfigError, Result};

/// Environment variable prefix for overrides, e.g. `WEFT_OUTPUT__PUBLICPATH=/static/`.
pub const ENV_PREFIX: &str = "WEFT_";

/// Config file used when `--config` is not given.
pub const CONFIG_ENV: &str = "WEFT_CONFIG";

/// Profile used when `--profile` is not given.
pub const PROFILE_ENV: &str = "WEFT_PROFILE";

/// Keys under the prefix that select a config instead of overriding it.
const RESERVED_ENV_KEYS: &[&str] = &["config", "profile"];

/// File-based configuration discovery
///
/// Searches for weft configuration files in conventional locations and loads them.
/// This is primarily for CLI use - library users should use `WeftConfig::from_value()` directly.
///
/// # Example
///
/// ```no_run
/// use weft_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. weft.toml
    /// 2. weft.json
    /// 3. package.json (weft field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in ["weft.toml", "weft.json"] {
            let path = self.root.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        // package.json with weft field
        let pkg_path = self.root.join("package.json");
        if pkg_path.is_file() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("weft").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<WeftConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        load_file(&path)
    }

    /// Load config with profile merging
    pub fn load_with_profile(&self, profile: &str) -> Result<WeftConfig> {
        self.load()?.materialize_profile(Some(profile))
    }
}

/// Load a specific config file, applying environment overrides.
///
/// The format is chosen from the file name: `package.json` reads its `weft`
/// field, `.json` and `.toml` files are read whole.
pub fn load_file(path: &Path) -> Result<WeftConfig> {
    let mut value = read_value(path)?;
    apply_env_overrides(&mut value)?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    WeftConfig::from_value(value)
}

fn read_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    if file_name == "package.json" {
        let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: "package.json".to_string(),
            hint: Some(format!("Invalid JSON: {}", e)),
        })?;

        return match parsed.get("weft") {
            Some(value) if !value.is_null() => Ok(value.clone()),
            Some(_) => Err(ConfigError::InvalidValue {
                field: "weft".to_string(),
                hint: Some("The 'weft' field cannot be null".to_string()),
            }),
            None => Err(ConfigError::InvalidValue {
                field: "weft".to_string(),
                hint: Some("Add a 'weft' field to your package.json".to_string()),
            }),
        };
    }

    match extension {
        "json" => serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: "json".to_string(),
            hint: Some(format!("Invalid JSON syntax: {}", e)),
        }),
        "toml" => {
            let toml_val: toml::Value =
                toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                    field: "toml".to_string(),
                    hint: Some(format!("Invalid TOML syntax: {}", e)),
                })?;
            serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: Some(format!("TOML to JSON conversion failed: {}", e)),
            })
        }
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Merge `WEFT_*` variables into a loaded config value.
///
/// Nested keys are separated by `__`. figment lowercases them, so each key is
/// matched case-insensitively against the loaded value and then against the
/// serialized defaults: `WEFT_OUTPUT__PUBLICPATH` sets `output.publicPath`
/// whether or not the file mentions it.
fn apply_env_overrides(value: &mut Value) -> Result<()> {
    let overrides: Value = Figment::from(
        Env::prefixed(ENV_PREFIX)
            .filter(|key| {
                !RESERVED_ENV_KEYS
                    .iter()
                    .any(|reserved| key.as_str().eq_ignore_ascii_case(reserved))
            })
            .split("__"),
    )
    .extract()
    .map_err(|e| ConfigError::InvalidValue {
        field: "environment".to_string(),
        hint: Some(e.to_string()),
    })?;

    if overrides.as_object().is_some_and(|o| !o.is_empty()) {
        tracing::debug!(?overrides, "applying environment overrides");
        let schema = WeftConfig::default().to_value()?;
        merge_case_insensitive(value, &overrides, &schema);
    }
    Ok(())
}

fn matching_key<'a>(mut keys: impl Iterator<Item = &'a String>, key: &str) -> Option<String> {
    keys.find(|k| k.eq_ignore_ascii_case(key)).cloned()
}

/// Merge `update` into `target`, spelling new keys the way `schema` does.
fn merge_case_insensitive(target: &mut Value, update: &Value, schema: &Value) {
    let Value::Object(update_map) = update else {
        *target = update.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(target_map) = target else {
        return;
    };

    for (key, value) in update_map {
        let existing = matching_key(target_map.keys(), key)
            .or_else(|| schema.as_object().and_then(|s| matching_key(s.keys(), key)))
            .unwrap_or_else(|| key.clone());
        let nested_schema = schema.get(&existing).unwrap_or(&Value::Null);
        merge_case_insensitive(
            target_map.entry(existing).or_insert(Value::Null),
            value,
            nested_schema,
        );
    }
}

/// Discover and load config from current directory (convenience function)
pub fn discover() -> Result<WeftConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

/// Discover and load config with profile (convenience function)
pub fn discover_with_profile(profile: &str) -> Result<WeftConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load_with_profile(profile)
}
