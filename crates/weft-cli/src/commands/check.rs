//! Check command implementation.
//!
//! Validates the schema and that every entry exists, without planning.

use weft_config::{ConfigValidator, FsValidator};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Find and load the configuration (profile merged)
/// 2. Schema validation: rules, registries, templates, cache groups
/// 3. Every entry exists below the project root
pub fn execute(args: CheckArgs) -> Result<()> {
    let loaded = utils::load(&args.source)?;
    ui::info(&format!("Checking {}", loaded.path.display()));

    FsValidator::new(&loaded.root).validate(&loaded.config)?;

    for (name, path) in loaded.config.entry.iter() {
        ui::success(&format!("  entry '{name}' -> {}", path.display()));
    }
    ui::success(&format!(
        "Configuration is valid: {} rule(s), {} plugin(s)",
        loaded.config.module.rules.len(),
        loaded.config.plugins.len()
    ));
    Ok(())
}
