//! Human-readable result summaries.
//!
//! Colors come from `yansi` and follow its global switch, so `--no-color`
//! (or `NO_COLOR`) only has to call `yansi::disable()` once at startup.

use std::fmt::Write;

use yansi::Paint;

use super::Report;
use crate::actions::relocate::MoveOutcome;
use crate::actions::{OrganizeStats, QuarantineStats, SweepStats, TempCleanStats};
use crate::duplicates::format_size;

/// Render a report as multi-line text, newline terminated.
#[must_use]
pub fn render_text(report: &Report) -> String {
    match report {
        Report::Dedupe(stats) => render_dedupe(stats),
        Report::Organize(stats) => render_organize(stats),
        Report::CleanTemp(stats) => render_temp(stats),
        Report::Sweep(stats) => render_sweep(stats),
    }
}

const BLOCKED: &str = "Blocked: target is inside a protected directory";

fn render_dedupe(stats: &QuarantineStats) -> String {
    if stats.blocked {
        return format!("{}\n", BLOCKED.red().bold());
    }

    let mut out = String::new();
    let title = if stats.dry_run {
        "Duplicate review (dry run)"
    } else {
        "Duplicate review"
    };
    let _ = writeln!(out, "{}", title.bold());
    let _ = writeln!(out, "  Groups found:     {}", stats.groups_found);
    let _ = writeln!(out, "  Duplicates found: {}", stats.duplicates_found);
    let verb = if stats.dry_run { "Would move" } else { "Moved" };
    let _ = writeln!(
        out,
        "  {:<17} {}",
        format!("{verb}:"),
        stats.moved_count.green()
    );
    let _ = writeln!(
        out,
        "  Reclaimed:        {}",
        format_size(stats.bytes_reclaimed).green()
    );
    if stats.hash_failures > 0 {
        let _ = writeln!(out, "  Unreadable:       {}", stats.hash_failures.yellow());
    }
    if stats.failures > 0 {
        let _ = writeln!(out, "  Failed:           {}", stats.failures.red());
    }
    write_outcomes(&mut out, &stats.outcomes);
    out
}

fn render_organize(stats: &OrganizeStats) -> String {
    if stats.blocked {
        return format!("{}\n", BLOCKED.red().bold());
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Organize".bold());
    let _ = writeln!(out, "  Moved:   {}", stats.moved.green());
    let _ = writeln!(out, "  Skipped: {}", stats.skipped);
    if stats.failures > 0 {
        let _ = writeln!(out, "  Failed:  {}", stats.failures.red());
    }
    write_outcomes(&mut out, &stats.outcomes);
    out
}

fn render_temp(stats: &TempCleanStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Temp cleanup".bold());
    let _ = writeln!(out, "  Deleted: {}", stats.deleted.green());
    let _ = writeln!(out, "  Freed:   {}", format_size(stats.bytes_freed).green());
    if stats.skipped > 0 {
        let _ = writeln!(out, "  Skipped: {} (in use or not permitted)", stats.skipped);
    }
    out
}

fn render_sweep(stats: &SweepStats) -> String {
    if stats.blocked {
        return format!("{}\n", BLOCKED.red().bold());
    }

    let mut out = String::new();
    let (title, verb) = if stats.dry_run {
        ("Empty folders (dry run)", "Would delete")
    } else {
        ("Empty folders", "Deleted")
    };
    let _ = writeln!(out, "{}", title.bold());
    for dir in &stats.directories {
        let _ = writeln!(out, "  {} {}", verb.dim(), dir.display());
    }
    let _ = writeln!(out, "  Total:  {}", stats.removed.green());
    if stats.failures > 0 {
        let _ = writeln!(out, "  Failed: {}", stats.failures.red());
    }
    if stats.dry_run && stats.removed > 0 {
        let _ = writeln!(out, "  Run again with --live to delete them.");
    }
    out
}

fn write_outcomes(out: &mut String, outcomes: &[MoveOutcome]) {
    for outcome in outcomes {
        match outcome {
            MoveOutcome::Moved { from, to } => {
                let _ = writeln!(
                    out,
                    "  {} {} -> {}",
                    "moved".green(),
                    from.display(),
                    to.display()
                );
            }
            MoveOutcome::Failed { path, reason } => {
                let _ = writeln!(out, "  {} {}: {}", "failed".red(), path.display(), reason);
            }
        }
    }
}
