//! Formatting for sizes, plans and diagnostics.

use console::Term;
use owo_colors::OwoColorize;
use weft_pipeline::{ArtifactKind, BuildPlan, Diagnostics, Severity};

use super::{colors_enabled, messages};

/// Format file size in human-readable format.
///
/// # Examples
///
/// ```
/// use weft_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

fn kind_label(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Script => "js",
        ArtifactKind::Stylesheet => "css",
        ArtifactKind::Asset => "asset",
        ArtifactKind::SourceMap => "map",
    }
}

/// Print the artifacts of a plan as a table on stderr.
pub fn print_plan_summary(plan: &BuildPlan) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let colors = colors_enabled();

    if colors {
        eprintln!("\n{}", "Build Plan".bold().underline());
    } else {
        eprintln!("\nBuild Plan");
    }
    eprintln!("{}", "─".repeat(width));

    for artifact in &plan.artifacts {
        let path = plan.output_dir.join(&artifact.path);
        let mut notes = Vec::new();
        if let Some(processor) = &artifact.minified_by {
            notes.push(format!("minified by {processor}"));
        }
        if let Some(of) = &artifact.map_of {
            notes.push(format!("map of {of}"));
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", notes.join(", "))
        };

        if colors {
            eprintln!(
                "  {} {:<5} {} {}{}",
                "▸".blue(),
                kind_label(artifact.kind).dimmed(),
                path.display().bright_white().bold(),
                format_size(artifact.size).dimmed(),
                notes.dimmed()
            );
        } else {
            eprintln!(
                "  ▸ {:<5} {} {}{}",
                kind_label(artifact.kind),
                path.display(),
                format_size(artifact.size),
                notes
            );
        }
    }

    eprintln!("{}", "─".repeat(width));
    let summary = plan.summary();
    eprintln!("  {summary}, {} total", format_size(summary.total_size));
    if !plan.externals.is_empty() {
        eprintln!("  externals: {}", plan.externals.join(", "));
    }
}

/// Print warnings and errors, in the order the plan holds them.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => messages::error(&diagnostic.to_string()),
            Severity::Warning => messages::warning(&diagnostic.to_string()),
            Severity::Info => tracing::debug!("{diagnostic}"),
        }
    }
}
