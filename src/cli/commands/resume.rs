//! resume command - Continue a failed or interrupted run

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{configured_backend, max_parallel, show_failure, show_report};
use crate::cli::Context;
use crate::core::ops::journal::RunJournal;
use crate::core::random::StdRandom;
use crate::engine::{ExecuteError, Executor, SeedPlan, StepContext};

/// Resume the run recorded in the state directory.
pub async fn resume(ctx: &Context, sequential: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let paths = config.seed_paths();

    // The journal is read again under the lock by the executor; this read
    // only recovers the random seed.
    let journal = RunJournal::read_optional(&paths)?.ok_or(ExecuteError::NoRunToResume)?;
    info!(run_id = %journal.run_id, phase = %journal.phase, "resuming run");

    let step_ctx = StepContext {
        backend: configured_backend(&config)?,
        rng: Arc::new(StdRandom::from_seed_option(journal.random_seed)),
        seller: config.seller_profile(),
    };
    let executor = Executor::new(step_ctx, SeedPlan::full()?)
        .with_state(paths)
        .with_max_parallel(max_parallel(&config, sequential));

    match executor.resume().await {
        Ok(report) => show_report(ctx, &report, false),
        Err(err) => Err(show_failure(ctx, err)),
    }
}
