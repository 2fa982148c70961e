//! Error types for build planning.

use std::path::PathBuf;

use thiserror::Error;
use weft_config::ConfigError;

use crate::diagnostics::Diagnostic;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("entry '{name}' not found: {}", .path.display())]
    EntryNotFound { name: String, path: PathBuf },

    #[error("'{first}' and '{second}' both emit {path}")]
    OutputCollision {
        path: String,
        first: String,
        second: String,
    },

    #[error("build failed with {} error(s): {}", .errors.len(), first_message(.errors))]
    BuildFailed { errors: Vec<Diagnostic> },
}

fn first_message(errors: &[Diagnostic]) -> String {
    errors
        .first()
        .map(|d| d.to_string())
        .unwrap_or_default()
}
