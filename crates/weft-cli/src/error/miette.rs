//! Miette report conversion for CLI errors.

use crate::error::CliError;
use miette::Report;
use weft_config::ConfigError;
use weft_pipeline::PipelineError;

/// Convert CliError to a miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Pipeline(e) => pipeline_error_to_miette(e),
        CliError::Config(e) => config_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::UnknownProcessor { .. } | ConfigError::UnknownPlugin { .. } => miette::miette!(
            help = "Identities must be registered; see the processor and plugin registries",
            "Configuration error: {}",
            err
        ),
        ConfigError::EntryNotFound { .. } => miette::miette!(
            help = "Entry paths are relative to `context`, or to the project root (--root)",
            "Configuration error: {}",
            err
        ),
        _ => miette::miette!("Configuration error: {}", err),
    }
}

fn pipeline_error_to_miette(err: PipelineError) -> Report {
    match err {
        PipelineError::Config(e) => config_error_to_miette(e),
        PipelineError::BuildFailed { errors } => {
            let listed: Vec<String> = errors.iter().map(|d| format!("  {d}")).collect();
            miette::miette!(
                help = "Run 'weft plan --verbose' to see how each module was resolved",
                "Build planning failed with {} error(s):\n{}",
                errors.len(),
                listed.join("\n")
            )
        }
        PipelineError::OutputCollision { .. } => miette::miette!(
            help = "Give the colliding outputs distinct names, e.g. with [name] or [id]",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}
