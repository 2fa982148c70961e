use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::build::helpers::default_max_asset_size;

/// Default source-map generation.
///
/// `false` disables it (maps are then emitted only through an explicit
/// source-map plugin); a string names a devtool style such as `source-map`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Devtool {
    #[default]
    Disabled,
    Named(String),
}

impl Devtool {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Devtool::Disabled)
    }

    /// Whether the devtool writes separate `.map` files.
    ///
    /// `eval*` and `inline*` styles embed maps in the bundle itself.
    pub fn emits_map_files(&self) -> bool {
        match self {
            Devtool::Disabled => false,
            Devtool::Named(name) => !name.starts_with("eval") && !name.contains("inline"),
        }
    }
}

impl Serialize for Devtool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Devtool::Disabled => serializer.serialize_bool(false),
            Devtool::Named(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for Devtool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match BoolOrString::deserialize(deserializer)? {
            BoolOrString::Bool(false) => Ok(Devtool::Disabled),
            BoolOrString::Bool(true) => Err(serde::de::Error::custom(
                "devtool must be false or a devtool name",
            )),
            BoolOrString::String(name) => Ok(Devtool::Named(name)),
        }
    }
}

/// Size-warning configuration for emitted assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSpec {
    #[serde(default)]
    pub hints: Hints,

    /// Assets larger than this many bytes trigger a hint
    #[serde(default = "default_max_asset_size")]
    pub max_asset_size: u64,
}

impl Default for PerformanceSpec {
    fn default() -> Self {
        Self {
            hints: Hints::default(),
            max_asset_size: default_max_asset_size(),
        }
    }
}

/// How oversized assets are reported: `false`, `"warning"` or `"error"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hints {
    Off,
    #[default]
    Warning,
    Error,
}

impl Serialize for Hints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Hints::Off => serializer.serialize_bool(false),
            Hints::Warning => serializer.serialize_str("warning"),
            Hints::Error => serializer.serialize_str("error"),
        }
    }
}

impl<'de> Deserialize<'de> for Hints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match BoolOrString::deserialize(deserializer)? {
            BoolOrString::Bool(false) => Ok(Hints::Off),
            BoolOrString::Bool(true) => Ok(Hints::Warning),
            BoolOrString::String(s) => match s.as_str() {
                "warning" => Ok(Hints::Warning),
                "error" => Ok(Hints::Error),
                other => Err(serde::de::Error::custom(format!(
                    "unknown performance hint level '{other}' (expected false, \"warning\" or \"error\")"
                ))),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}
