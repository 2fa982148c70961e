use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::PrintFormat;

/// Available weft subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configuration
    ///
    /// Checks the schema (rules, registries, templates, cache groups) and
    /// that every entry exists below the project root.
    Check(CheckArgs),

    /// Compute the build plan
    ///
    /// Walks the module graph from the entries and prints the resulting
    /// chunks, artifacts and diagnostics.
    Plan(PlanArgs),

    /// Print the normalized configuration
    ///
    /// Defaults are filled in and the selected profile is merged.
    Print(PrintArgs),

    /// Write the classic preset as weft.toml
    Init(InitArgs),
}

/// Where the configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path to the configuration file
    ///
    /// weft.toml, weft.json or package.json. When omitted, WEFT_CONFIG is
    /// used, then the project root is searched in that order.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile merged onto the base configuration
    ///
    /// Falls back to WEFT_PROFILE.
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Project root entries and rules are resolved against
    ///
    /// Defaults to the directory of --config, or the current directory.
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the full plan as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write the plan as JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Arguments for the print command
#[derive(Args, Debug)]
pub struct PrintArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: PrintFormat,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write weft.toml into
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// Overwrite an existing weft.toml
    #[arg(short, long)]
    pub force: bool,
}
