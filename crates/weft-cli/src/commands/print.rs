//! Print command implementation.

use crate::cli::{PrintArgs, PrintFormat};
use crate::commands::utils;
use crate::error::Result;

/// Execute the print command: the normalized configuration on stdout.
pub fn execute(args: PrintArgs) -> Result<()> {
    let loaded = utils::load(&args.source)?;
    let rendered = match args.format {
        PrintFormat::Json => loaded.config.to_json_string()?,
        PrintFormat::Toml => loaded.config.to_toml_string()?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
