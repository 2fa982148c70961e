//! weft CLI entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use miette::Result;
use weft_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Check(check_args) => commands::check_execute(check_args),
        cli::Command::Plan(plan_args) => commands::plan_execute(plan_args),
        cli::Command::Print(print_args) => commands::print_execute(print_args),
        cli::Command::Init(init_args) => commands::init_execute(init_args),
    };

    result.map_err(error::cli_error_to_miette)
}
