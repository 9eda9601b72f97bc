//! run command - Run the seed pipeline

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{configured_backend, max_parallel, show_failure, show_report};
use crate::backend::{Backend, InMemoryBackend};
use crate::cli::Context;
use crate::core::random::StdRandom;
use crate::engine::{Executor, RunOptions, SeedPlan, StepContext};

/// Run every step of the seed plan.
///
/// # Arguments
///
/// * `ctx` - Global options
/// * `dry_run` - Use a fresh in-memory backend and write no state
/// * `force` - Seed again over a committed run
/// * `sequential` - One step at a time in reference order
/// * `seed` - Random seed; overrides `run.random_seed`
pub async fn run(
    ctx: &Context,
    dry_run: bool,
    force: bool,
    sequential: bool,
    seed: Option<u64>,
) -> Result<()> {
    let config = ctx.load_config()?;

    // Always record a seed so a resumed run draws from the same stream.
    let random_seed = seed.or(config.random_seed()).unwrap_or_else(rand::random);

    let backend: Arc<dyn Backend> = if dry_run {
        Arc::new(InMemoryBackend::with_default_store())
    } else {
        configured_backend(&config)?
    };
    info!(backend = backend.name(), random_seed, dry_run, "starting seed run");

    let step_ctx = StepContext {
        backend,
        rng: Arc::new(StdRandom::seeded(random_seed)),
        seller: config.seller_profile(),
    };
    let mut executor = Executor::new(step_ctx, SeedPlan::full()?)
        .with_max_parallel(max_parallel(&config, sequential));
    if !dry_run {
        executor = executor.with_state(config.seed_paths());
    }

    let options = RunOptions {
        force,
        random_seed: Some(random_seed),
    };
    match executor.run(options).await {
        Ok(report) => show_report(ctx, &report, dry_run),
        Err(err) => Err(show_failure(ctx, err)),
    }
}
