//! Error types for configuration validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors (for CLI use)
    #[error("entry '{name}' not found: {}", .path.display())]
    EntryNotFound { name: String, path: PathBuf },

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}'{}", hint_suffix(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid profile override: {message}")]
    InvalidProfileOverride { message: String },

    #[error("profile '{0}' is not defined")]
    ProfileNotFound(String),

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    // Schema validation errors (no filesystem checks)
    #[error("no entries specified")]
    NoEntries,

    #[error("rule #{rule} has an empty processor chain")]
    EmptyProcessorChain { rule: usize },

    #[error("rule #{rule} references unknown processor '{loader}'")]
    UnknownProcessor { rule: usize, loader: String },

    #[error("plugin #{index} references unknown plugin '{plugin}'")]
    UnknownPlugin { index: usize, plugin: String },

    #[error("entries '{first}' and '{second}' both emit {path}")]
    OutputCollision {
        path: String,
        first: String,
        second: String,
    },

    #[error(
        "cache groups '{first}' and '{second}' share pattern and priority {priority}; assignment would be ambiguous"
    )]
    AmbiguousCacheGroups {
        first: String,
        second: String,
        priority: i32,
    },

    #[error("schema validation failed: {message}{}", hint_suffix(.hint))]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({hint})"),
        None => String::new(),
    }
}

impl ConfigError {
    pub(crate) fn schema(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigError::SchemaValidation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}
