use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::build::helpers::{
    default_css_asset_pattern, default_css_chunk_filename, default_css_filename,
    default_css_processor, default_true,
};
use crate::build::output::FileNameTemplate;
use crate::dev::DevProxyOptions;
use crate::error::{ConfigError, Result};
use crate::pattern::Pattern;
use crate::registry::plugins;

/// One entry of the ordered `plugins` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Registered plugin identity
    pub plugin: String,

    /// Plugin-specific options
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl PluginSpec {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            options: Value::Null,
        }
    }

    /// Build a spec from typed options.
    pub fn with<T: Serialize>(plugin: impl Into<String>, options: &T) -> Result<Self> {
        let plugin = plugin.into();
        let options = serde_json::to_value(options).map_err(|e| ConfigError::InvalidValue {
            field: format!("plugins.{plugin}.options"),
            hint: Some(e.to_string()),
        })?;
        Ok(Self { plugin, options })
    }

    /// Decode the options into a typed structure; absent options decode as `{}`.
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T> {
        let value = if self.options.is_null() {
            Value::Object(Default::default())
        } else {
            self.options.clone()
        };
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: format!("plugins.{}.options", self.plugin),
            hint: Some(e.to_string()),
        })
    }

    /// Options of the known plugin identities, decoded.
    ///
    /// Returns `Ok(None)` for identities without typed options.
    pub fn typed_options(&self) -> Result<Option<PluginOptions>> {
        let typed = match self.plugin.as_str() {
            plugins::CSS_EXTRACT => PluginOptions::CssExtract(self.options_as()?),
            plugins::CSS_MINIMIZER => PluginOptions::CssMinimizer(self.options_as()?),
            plugins::FRIENDLY_ERRORS => PluginOptions::FriendlyErrors(self.options_as()?),
            plugins::DEV_PROXY => PluginOptions::DevProxy(self.options_as()?),
            plugins::SOURCE_MAP => PluginOptions::SourceMap(self.options_as()?),
            _ => return Ok(None),
        };
        Ok(Some(typed))
    }
}

/// Decoded options for the built-in plugin identities.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginOptions {
    CssExtract(CssExtractOptions),
    CssMinimizer(CssMinimizerOptions),
    FriendlyErrors(FriendlyErrorsOptions),
    DevProxy(DevProxyOptions),
    SourceMap(SourceMapPluginOptions),
}

/// Stylesheet extraction: one CSS file per chunk that contains extracted styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssExtractOptions {
    /// Template for stylesheets of entry chunks
    #[serde(default = "default_css_filename")]
    pub filename: FileNameTemplate,

    /// Template for stylesheets of non-entry chunks
    #[serde(default = "default_css_chunk_filename")]
    pub chunk_filename: FileNameTemplate,
}

impl Default for CssExtractOptions {
    fn default() -> Self {
        Self {
            filename: default_css_filename(),
            chunk_filename: default_css_chunk_filename(),
        }
    }
}

/// CSS minification for emitted stylesheets whose name matches `asset_name_reg_exp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssMinimizerOptions {
    #[serde(default = "default_css_asset_pattern", rename = "assetNameRegExp")]
    pub asset_name_reg_exp: Pattern,

    /// Identity of the external CSS processor
    #[serde(default = "default_css_processor")]
    pub css_processor: String,

    /// Print a summary line per minimized asset
    #[serde(default = "default_true")]
    pub can_print: bool,

    /// Options forwarded verbatim to the processor
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub css_processor_plugin_options: Value,
}

impl Default for CssMinimizerOptions {
    fn default() -> Self {
        Self {
            asset_name_reg_exp: default_css_asset_pattern(),
            css_processor: default_css_processor(),
            css_processor_plugin_options: Value::Null,
            can_print: true,
        }
    }
}

/// Aggregated error reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendlyErrorsOptions {
    /// Clear previous output before printing a report
    #[serde(default = "default_true")]
    pub clear_console: bool,

    /// Messages printed after a successful build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_messages: Vec<String>,
}

impl Default for FriendlyErrorsOptions {
    fn default() -> Self {
        Self {
            clear_console: true,
            success_messages: Vec::new(),
        }
    }
}

/// Explicit source-map emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapPluginOptions {
    /// Template for map files; maps are inlined when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<FileNameTemplate>,

    /// Artifacts whose path starts with any of these prefixes get no map
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl SourceMapPluginOptions {
    pub fn excludes(&self, file: &str) -> bool {
        self.exclude.iter().any(|prefix| file.starts_with(prefix.as_str()))
    }
}
