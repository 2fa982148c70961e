//! weft CLI - validate bundler configurations and plan builds.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`commands`] - `check`, `plan`, `print` and `init`
//! - [`error`] - Error types with actionable hints, miette conversion
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - Status lines and plan summaries on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
