//! High-level configuration structure for weft.
//!
//! This module provides the main `WeftConfig` struct, its (de)serialization
//! helpers and profile merging. For file discovery, see the `discovery` module.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::build::{
    Devtool, EntryMap, ModuleSpec, OptimizationSpec, OutputSpec, PerformanceSpec, PluginSpec,
};
use crate::error::{ConfigError, Result as ConfigResult};

/// The complete declarative build configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeftConfig {
    /// Base directory entries and rule includes are resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    /// Source map style, kept ahead of the table-valued fields for TOML output
    #[serde(default)]
    pub devtool: Devtool,

    #[serde(default)]
    pub entry: EntryMap,

    #[serde(default)]
    pub output: OutputSpec,

    #[serde(default)]
    pub module: ModuleSpec,

    #[serde(default)]
    pub plugins: Vec<PluginSpec>,

    #[serde(default)]
    pub optimization: OptimizationSpec,

    #[serde(default)]
    pub performance: PerformanceSpec,

    /// Named overlays merged onto the base configuration
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub profiles: IndexMap<String, Value>,
}

impl WeftConfig {
    /// Create from serde_json::Value (for programmatic config from DB/API)
    ///
    /// # Example
    ///
    /// ```
    /// use weft_config::WeftConfig;
    /// use serde_json::json;
    /// use std::path::Path;
    ///
    /// let value = json!({
    ///     "entry": { "main": "./src/js/index.js" },
    ///     "output": { "filename": "[name].js" }
    /// });
    ///
    /// let config = WeftConfig::from_value(value).unwrap();
    /// assert_eq!(config.entry.get("main"), Some(Path::new("./src/js/index.js")));
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        serde_json::from_str(source).map_err(|e| ConfigError::InvalidValue {
            field: "json".to_string(),
            hint: Some(format!("Invalid JSON config: {}", e)),
        })
    }

    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        toml::from_str(source).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("Invalid TOML config: {}", e)),
        })
    }

    pub fn to_json_string(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Directory entries and includes are relative to, given the project root.
    pub fn context_dir(&self, root: &std::path::Path) -> PathBuf {
        match &self.context {
            Some(context) => root.join(context),
            None => root.to_path_buf(),
        }
    }
}

impl WeftConfig {
    /// Merge the named profile onto the base configuration.
    ///
    /// Objects merge key by key, everything else (arrays included) replaces
    /// the base value. The returned configuration keeps its profile table so
    /// it can be materialized again.
    pub fn materialize_profile(self, profile: Option<&str>) -> ConfigResult<Self> {
        let Some(name) = profile else {
            return Ok(self);
        };

        let overlay = self
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;

        if overlay.is_null() {
            return Ok(self);
        }
        if !overlay.is_object() {
            return Err(ConfigError::InvalidProfileOverride {
                message: format!("profile '{name}' must be a table"),
            });
        }

        tracing::debug!(profile = name, "materializing profile");

        let profiles = self.profiles.clone();
        let mut base = serde_json::to_value(&self).map_err(|err| {
            ConfigError::InvalidProfileOverride {
                message: err.to_string(),
            }
        })?;
        merge_values(&mut base, &overlay);

        let mut merged: WeftConfig =
            serde_json::from_value(base).map_err(|err| ConfigError::InvalidProfileOverride {
                message: format!("profile '{name}': {err}"),
            })?;
        merged.profiles = profiles;
        Ok(merged)
    }
}

/// Deep-merge `update` into `target`.
///
/// Keys already present in `target` keep their position; new keys are appended.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, Value::Object(update_map)) => {
            let mut new_obj = serde_json::Map::with_capacity(update_map.len());
            for (key, value) in update_map {
                new_obj.insert(key.clone(), value.clone());
            }
            *target_slot = Value::Object(new_obj);
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn from_value_creates_config() {
        let value = json!({
            "entry": { "main": "./src/js/index.js" },
            "performance": { "hints": false }
        });

        let config = WeftConfig::from_value(value).unwrap();
        assert_eq!(config.entry.get("main"), Some(Path::new("./src/js/index.js")));
        assert_eq!(config.performance.hints, crate::Hints::Off);
    }

    #[test]
    fn to_value_serializes_camel_case() {
        let config = WeftConfig::default();
        let value = config.to_value().unwrap();
        assert_eq!(value["output"]["sourceMapFilename"], json!("[file].map"));
        assert_eq!(value["output"]["publicPath"], json!("/"));
        assert_eq!(value["devtool"], json!(false));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let result = WeftConfig::default().materialize_profile(Some("production"));
        assert!(matches!(result, Err(ConfigError::ProfileNotFound(name)) if name == "production"));
    }

    #[test]
    fn profile_merging_works() {
        let value = json!({
            "entry": { "main": "./src/index.js" },
            "output": { "filename": "[name].js", "publicPath": "/" },
            "profiles": {
                "production": {
                    "output": { "publicPath": "/static/" },
                    "devtool": "source-map"
                }
            }
        });

        let config = WeftConfig::from_value(value)
            .unwrap()
            .materialize_profile(Some("production"))
            .unwrap();

        assert_eq!(config.output.public_path, "/static/");
        assert_eq!(config.output.filename.as_str(), "[name].js");
        assert_eq!(config.devtool, Devtool::Named("source-map".into()));
        assert!(config.profiles.contains_key("production"));
    }

    #[test]
    fn merge_keeps_existing_key_positions() {
        let mut base = json!({ "a": 1, "b": 2, "c": 3 });
        merge_values(&mut base, &json!({ "b": 20, "d": 4 }));
        let keys: Vec<_> = base.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(base["b"], json!(20));
    }

    #[test]
    fn merge_replaces_arrays() {
        let mut base = json!({ "plugins": [1, 2, 3] });
        merge_values(&mut base, &json!({ "plugins": [4] }));
        assert_eq!(base["plugins"], json!([4]));
    }
}
