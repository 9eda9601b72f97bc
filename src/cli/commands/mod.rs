//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration (commands that touch state or a backend)
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT call the backend directly.

mod abandon;
mod completion;
mod plan;
mod resume;
mod run;
mod status;

// Re-export command functions for testing and direct invocation
pub use abandon::abandon;
pub use completion::{completion, write_completion};
pub use plan::plan;
pub use resume::resume;
pub use run::run;
pub use status::status;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::Context;
use crate::backend::{create_backend, Backend};
use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::{ExecuteError, RunReport};
use crate::ui::output;

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Run {
            dry_run,
            force,
            sequential,
            seed,
        } => run::run(ctx, dry_run, force, sequential, seed).await,
        Command::Resume { sequential } => resume::resume(ctx, sequential).await,
        Command::Abandon => abandon::abandon(ctx),
        Command::Status => status::status(ctx),
        Command::Plan => plan::plan(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Build the backend named by the configuration.
fn configured_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    create_backend(
        config.backend_kind(),
        config.backend_url(),
        config.backend_token().map(str::to_string),
    )
    .with_context(|| format!("cannot use the {} backend", config.backend_kind()))
}

/// Step concurrency for this invocation.
fn max_parallel(config: &Config, sequential: bool) -> usize {
    if sequential {
        1
    } else {
        config.max_parallel()
    }
}

/// Print a successful run.
fn show_report(ctx: &Context, report: &RunReport, dry_run: bool) -> Result<()> {
    if ctx.json {
        output::print_json(report)?;
    } else {
        output::print(output::format_report(report, dry_run), ctx.verbosity);
    }
    Ok(())
}

/// Report what a failed run left behind, then hand the error back.
///
/// With `--json` the created IDs go to stdout as a JSON object; otherwise
/// they are listed on stderr unless `--quiet` is set.
fn show_failure(ctx: &Context, err: ExecuteError) -> anyhow::Error {
    if let Some(summary) = failure_summary(&err) {
        if ctx.json {
            if let Err(e) = output::print_json(&summary) {
                return anyhow::Error::new(err).context(format!("cannot print failure: {}", e));
            }
        } else if let ExecuteError::Step { created, .. } = &err {
            output::warn(output::format_failure(created), ctx.verbosity);
        }
    }
    err.into()
}

/// Machine-readable form of a failed step, or `None` for other errors.
fn failure_summary(err: &ExecuteError) -> Option<serde_json::Value> {
    match err {
        ExecuteError::Step {
            step,
            source,
            created,
        } => Some(serde_json::json!({
            "failed_step": step.name(),
            "error": source.to_string(),
            "created": created,
        })),
        _ => None,
    }
}
