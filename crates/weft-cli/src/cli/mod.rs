//! Command-line interface definition for weft.
//!
//! The CLI is declared with clap's derive macros.
//!
//! # Command Structure
//!
//! - `weft check` - Validate a configuration against the schema and the project files
//! - `weft plan` - Plan a build and print or write the plan
//! - `weft print` - Print the normalized configuration
//! - `weft init` - Write the classic preset as `weft.toml`

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{CheckArgs, Command, InitArgs, PlanArgs, PrintArgs, SourceArgs};
pub use enums::*;

/// weft - declarative bundler configuration and build planning
#[derive(Parser, Debug)]
#[command(
    name = "weft",
    version,
    about = "Validate bundler configurations and plan builds",
    long_about = "weft reads a declarative bundler configuration (weft.toml, weft.json or the\n\
                  \"weft\" field of package.json), validates it and computes the build plan:\n\
                  which processors each module runs through, which chunks it lands in and\n\
                  which files the bundler engine has to emit."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every resolved module, matched rule and applied plugin.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
