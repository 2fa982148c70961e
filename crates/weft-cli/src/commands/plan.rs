//! Plan command implementation.

use std::fs;

use weft_pipeline::{FsSourceGraph, Planner};

use crate::cli::PlanArgs;
use crate::commands::utils;
use crate::error::{Result, ResultExt};
use crate::ui;

/// Execute the plan command.
///
/// Plans the build over the files below the project root. The plan goes to
/// stdout with `--json`, to a file with `--out`, and is summarized on stderr
/// otherwise.
pub fn execute(args: PlanArgs) -> Result<()> {
    let loaded = utils::load(&args.source)?;
    let source = FsSourceGraph::new(&loaded.root);

    let plan = Planner::new().plan(&loaded.config, &source)?;

    if let Some(out) = &args.out {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_path(parent)?;
        }
        fs::write(out, plan.to_json()?).with_path(out)?;
        ui::success(&format!("Wrote plan to {}", out.display()));
    }

    if args.json {
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    ui::print_plan_summary(&plan);
    ui::print_diagnostics(&plan.diagnostics);
    if let Some(dev) = &plan.dev_server {
        ui::info(&format!("Dev proxy on {}", dev.listen));
    }
    ui::success("Build planned");
    Ok(())
}
