//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::{Display, Write as _};

use serde::Serialize;

use crate::core::ops::journal::RunJournal;
use crate::engine::{RunReport, SeedPlan, StepId};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON on stdout (always shown).
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of a finished run.
pub fn format_report(report: &RunReport, dry_run: bool) -> String {
    let mut out = String::new();
    let _ = match (&report.run_id, dry_run) {
        (_, true) => writeln!(out, "Dry run against the in-memory backend"),
        (Some(run_id), false) => writeln!(out, "Run {} committed", run_id),
        (None, false) => writeln!(out, "Run completed"),
    };
    for step in &report.skipped {
        let _ = writeln!(out, "  {:<20} skipped (completed earlier)", step.name());
    }
    for executed in &report.executed {
        let _ = writeln!(
            out,
            "  {:<20} {}",
            executed.step.name(),
            if executed.ids.is_empty() {
                "no change".to_string()
            } else {
                executed.ids.join(", ")
            }
        );
    }
    out.trim_end().to_string()
}

/// Phase, steps and IDs recorded in a journal.
pub fn format_journal(journal: &RunJournal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run {}", journal.run_id);
    let _ = writeln!(out, "  phase:    {}", journal.phase);
    let _ = writeln!(out, "  started:  {}", journal.started_at);
    if let Some(finished) = &journal.finished_at {
        let _ = writeln!(out, "  finished: {}", finished);
    }
    if let Some(seed) = journal.random_seed {
        let _ = writeln!(out, "  seed:     {}", seed);
    }
    let _ = writeln!(
        out,
        "  steps:    {}/{} completed",
        journal.completed.len(),
        StepId::ALL.len()
    );
    for completed in &journal.completed {
        let _ = writeln!(out, "    {:<20} {}", completed.step.name(), completed.ids.join(", "));
    }
    if let Some(failure) = &journal.failure {
        let _ = writeln!(out, "  failed:   {} ({})", failure.step, failure.message);
    }
    out.trim_end().to_string()
}

/// IDs left behind by a run, one per line, for manual cleanup.
pub fn format_created_ids(journal: &RunJournal) -> String {
    let lines: Vec<String> = journal
        .created_ids()
        .into_iter()
        .map(|(step, id)| format!("{:<20} {}", step.name(), id))
        .collect();
    format_list(&lines, "  ")
}

/// What a failed run left behind, followed by the ways out.
pub fn format_failure(created: &[String]) -> String {
    let mut out = String::new();
    if created.is_empty() {
        out.push_str("nothing was created before the failure\n");
    } else {
        let _ = writeln!(out, "created before the failure:");
        let _ = writeln!(out, "{}", format_list(created, "  "));
    }
    out.push_str("continue with 'mseed resume' or give up with 'mseed abandon'");
    out
}

/// Dependency layers and the sequential order of a plan.
pub fn format_plan(plan: &SeedPlan, layers: &[Vec<StepId>], order: &[StepId]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Plan {} ({} steps)", plan.digest(), plan.len());
    let _ = writeln!(out, "Layers:");
    for (index, layer) in layers.iter().enumerate() {
        let names: Vec<&str> = layer.iter().map(|s| s.name()).collect();
        let _ = writeln!(out, "  {}: {}", index, names.join(", "));
    }
    let _ = writeln!(out, "Sequential order:");
    for (index, step) in order.iter().enumerate() {
        let deps: Vec<&str> = step.dependencies().iter().map(|d| d.name()).collect();
        let _ = write!(out, "  {:>2}. {:<20} {}", index + 1, step.name(), step.description());
        if !deps.is_empty() {
            let _ = write!(out, " (after {})", deps.join(", "));
        }
        let _ = writeln!(out);
    }
    out.trim_end().to_string()
}
