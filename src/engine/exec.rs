//! engine::exec
//!
//! The seed executor.
//!
//! # Executor Contract
//!
//! With a state directory, the executor:
//! 1. Acquires the run lock before any backend call
//! 2. Refuses to start over a committed run (unless forced) or over an
//!    unfinished journal
//! 3. Writes the journal before the first step
//! 4. Appends every completed step, with its IDs and the outputs so far
//! 5. On step failure: lets in-flight steps of the same layer finish and
//!    journals them, records the failure, and stops
//! 6. After the last step: commits the journal and writes the seeded marker
//!
//! Without a state directory (dry runs) steps 1-3 and 6 are skipped and
//! nothing touches disk.
//!
//! # Scheduling
//!
//! Steps run layer by layer (see [`StepGraph::layers`](super::graph::StepGraph::layers)).
//! Within a layer up to `max_parallel` steps run concurrently; each gets a
//! snapshot of the outputs as they stood when the layer started. In
//! sequential mode steps run one at a time in reference order.
//!
//! # Example
//!
//! ```ignore
//! let executor = Executor::new(ctx, SeedPlan::full()?)
//!     .with_state(SeedPaths::new(".mseed"))
//!     .with_max_parallel(4);
//! let report = executor.run(RunOptions::default()).await?;
//! println!("seeded {} steps", report.executed.len());
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::graph::GraphError;
use super::plan::{SeedPlan, StepId};
use super::step::{run_step, StepContext, StepOutput};
use crate::core::ops::journal::{JournalError, RunId, RunJournal, RunPhase, SeedMarker};
use crate::core::ops::lock::{LockError, RunLock};
use crate::core::paths::SeedPaths;
use crate::seed::{SeedError, SeedOutputs};

/// Errors from execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A committed run already seeded this state directory.
    #[error("already seeded by run {run_id}; use --force to seed again")]
    AlreadySeeded { run_id: RunId },

    /// An unfinished run owns the state directory.
    #[error("run {run_id} is {phase}; use 'mseed resume' or 'mseed abandon'")]
    RunInProgress { run_id: RunId, phase: RunPhase },

    #[error("no run to resume")]
    NoRunToResume,

    #[error("run {run_id} is {phase} and cannot be resumed")]
    NotResumable { run_id: RunId, phase: RunPhase },

    /// The journal was written by a different plan.
    #[error("journal plan digest {found} does not match current plan {expected}")]
    PlanMismatch { expected: String, found: String },

    /// A seed step failed. `created` lists the IDs recorded by every step
    /// that completed before the run stopped.
    #[error("step '{step}' failed: {source}")]
    Step {
        step: StepId,
        #[source]
        source: SeedError,
        created: Vec<String>,
    },

    /// A step task panicked or was cancelled.
    #[error("step '{step}' did not complete: {message}")]
    TaskFailed { step: StepId, message: String },

    #[error("invalid plan: {0}")]
    Graph(#[from] GraphError),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("failed to acquire lock: {0}")]
    Lock(#[from] LockError),
}

/// Options for a fresh run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Seed again even if a committed run exists.
    pub force: bool,
    /// Recorded in the journal so a resume can rebuild the same random
    /// source.
    pub random_seed: Option<u64>,
}

/// A step executed by this invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedStep {
    pub step: StepId,
    pub ids: Vec<String>,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// `None` for runs without a state directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    /// Steps executed now, in completion order.
    pub executed: Vec<ExecutedStep>,
    /// Steps skipped because an earlier invocation completed them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<StepId>,
    pub outputs: SeedOutputs,
}

/// Progress of one execution pass.
struct Progress<'a> {
    journal: Option<&'a mut RunJournal>,
    outputs: SeedOutputs,
    executed: Vec<ExecutedStep>,
    /// IDs from steps completed in earlier invocations.
    prior_ids: Vec<String>,
}

impl Progress<'_> {
    fn record(&mut self, paths: Option<&SeedPaths>, output: StepOutput) -> Result<(), ExecuteError> {
        let step = output.step();
        let ids = output.ids();
        info!(step = %step, ids = ?ids, "step completed");
        self.outputs.apply(output);
        if let (Some(journal), Some(paths)) = (self.journal.as_deref_mut(), paths) {
            journal.append_step(paths, step, ids.clone(), &self.outputs)?;
        }
        self.executed.push(ExecutedStep { step, ids });
        Ok(())
    }

    fn fail(
        &mut self,
        paths: Option<&SeedPaths>,
        step: StepId,
        source: SeedError,
    ) -> Result<ExecuteError, ExecuteError> {
        error!(step = %step, error = %source, "step failed");
        if let (Some(journal), Some(paths)) = (self.journal.as_deref_mut(), paths) {
            journal.append_failure(paths, step, source.to_string())?;
        }
        let created = self.created_ids();
        if !created.is_empty() {
            warn!(ids = ?created, "run stopped; entities created so far are left in place");
        }
        Ok(ExecuteError::Step {
            step,
            source,
            created,
        })
    }

    fn created_ids(&self) -> Vec<String> {
        self.prior_ids
            .iter()
            .cloned()
            .chain(self.executed.iter().flat_map(|e| e.ids.iter().cloned()))
            .collect()
    }
}

/// Runs a [`SeedPlan`] against a backend.
#[derive(Debug)]
pub struct Executor {
    ctx: StepContext,
    plan: SeedPlan,
    paths: Option<SeedPaths>,
    max_parallel: usize,
}

impl Executor {
    /// An executor with no state directory that runs one step at a time.
    pub fn new(ctx: StepContext, plan: SeedPlan) -> Self {
        Self {
            ctx,
            plan,
            paths: None,
            max_parallel: 1,
        }
    }

    /// Journal and lock under `paths`.
    pub fn with_state(mut self, paths: SeedPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Run up to `n` independent steps at once. `n <= 1` is sequential.
    pub fn with_max_parallel(mut self, n: usize) -> Self {
        self.max_parallel = n.max(1);
        self
    }

    pub fn is_sequential(&self) -> bool {
        self.max_parallel <= 1
    }

    pub fn plan(&self) -> &SeedPlan {
        &self.plan
    }

    /// Start a fresh run.
    pub async fn run(&self, options: RunOptions) -> Result<RunReport, ExecuteError> {
        let Some(paths) = self.paths.as_ref() else {
            let mut progress = Progress {
                journal: None,
                outputs: SeedOutputs::default(),
                executed: Vec::new(),
                prior_ids: Vec::new(),
            };
            self.execute(&mut progress, &BTreeSet::new()).await?;
            return Ok(RunReport {
                run_id: None,
                executed: progress.executed,
                skipped: Vec::new(),
                outputs: progress.outputs,
            });
        };

        let _lock = RunLock::acquire(paths)?;

        if let Some(marker) = SeedMarker::read(paths)? {
            if !options.force {
                return Err(ExecuteError::AlreadySeeded {
                    run_id: marker.run_id,
                });
            }
            warn!(previous = %marker.run_id, "seeding again over a committed run");
        }
        if let Some(existing) = RunJournal::read_optional(paths)? {
            if existing.phase.is_resumable() {
                return Err(ExecuteError::RunInProgress {
                    run_id: existing.run_id,
                    phase: existing.phase,
                });
            }
        }

        let mut journal = RunJournal::new(self.plan.digest(), options.random_seed);
        journal.write(paths)?;
        info!(run_id = %journal.run_id, steps = self.plan.len(), "starting seed run");

        self.finish(paths, journal, BTreeSet::new(), Vec::new()).await
    }

    /// Continue the unfinished run in the state directory.
    pub async fn resume(&self) -> Result<RunReport, ExecuteError> {
        let paths = self.paths.as_ref().ok_or(ExecuteError::NoRunToResume)?;
        let _lock = RunLock::acquire(paths)?;

        let mut journal = RunJournal::read_optional(paths)?.ok_or(ExecuteError::NoRunToResume)?;
        if !journal.phase.is_resumable() {
            return Err(ExecuteError::NotResumable {
                run_id: journal.run_id,
                phase: journal.phase,
            });
        }
        let expected = self.plan.digest();
        if journal.plan_digest != expected {
            return Err(ExecuteError::PlanMismatch {
                expected,
                found: journal.plan_digest,
            });
        }

        journal.append_resume(paths)?;
        let completed: BTreeSet<StepId> = journal.completed_steps().collect();
        for step in &completed {
            warn!(step = %step, "skipping step completed by an earlier invocation");
        }
        let prior_ids = journal
            .created_ids()
            .into_iter()
            .map(|(_, id)| id.to_string())
            .collect();
        info!(run_id = %journal.run_id, remaining = self.plan.len() - completed.len(), "resuming seed run");

        self.finish(paths, journal, completed, prior_ids).await
    }

    async fn finish(
        &self,
        paths: &SeedPaths,
        mut journal: RunJournal,
        completed: BTreeSet<StepId>,
        prior_ids: Vec<String>,
    ) -> Result<RunReport, ExecuteError> {
        let outputs = journal.outputs.clone();
        let run_id = journal.run_id.clone();
        let mut progress = Progress {
            journal: Some(&mut journal),
            outputs,
            executed: Vec::new(),
            prior_ids,
        };
        self.execute(&mut progress, &completed).await?;
        let Progress {
            outputs, executed, ..
        } = progress;

        journal.append_commit(paths)?;
        SeedMarker::from_journal(&journal).write(paths)?;
        info!(run_id = %run_id, "seed run committed");

        let mut skipped: Vec<StepId> = completed.into_iter().collect();
        skipped.sort();
        Ok(RunReport {
            run_id: Some(run_id),
            executed,
            skipped,
            outputs,
        })
    }

    async fn execute(
        &self,
        progress: &mut Progress<'_>,
        completed: &BTreeSet<StepId>,
    ) -> Result<(), ExecuteError> {
        if self.is_sequential() {
            for step in self.plan.remaining(completed)? {
                self.execute_one(progress, step).await?;
            }
            return Ok(());
        }

        for (index, layer) in self.plan.layers()?.into_iter().enumerate() {
            let pending: Vec<StepId> = layer
                .into_iter()
                .filter(|step| !completed.contains(step))
                .collect();
            if pending.is_empty() {
                continue;
            }
            debug!(layer = index, steps = ?pending, "starting layer");
            self.execute_layer(progress, pending).await?;
        }
        Ok(())
    }

    async fn execute_one(&self, progress: &mut Progress<'_>, step: StepId) -> Result<(), ExecuteError> {
        let paths = self.paths.as_ref();
        let result = run_step(step, &self.ctx, &progress.outputs)
            .instrument(info_span!("step", step = %step))
            .await;
        match result {
            Ok(output) => progress.record(paths, output),
            Err(source) => Err(progress.fail(paths, step, source)?),
        }
    }

    async fn execute_layer(
        &self,
        progress: &mut Progress<'_>,
        steps: Vec<StepId>,
    ) -> Result<(), ExecuteError> {
        let paths = self.paths.as_ref();
        let snapshot = Arc::new(progress.outputs.clone());
        let mut queue = steps.into_iter();
        let mut tasks = JoinSet::new();
        let mut in_flight: BTreeSet<StepId> = BTreeSet::new();
        let mut failure: Option<ExecuteError> = None;
        let mut panicked: Option<String> = None;

        loop {
            while failure.is_none() && panicked.is_none() && in_flight.len() < self.max_parallel {
                let Some(step) = queue.next() else { break };
                let ctx = self.ctx.clone();
                let outputs = Arc::clone(&snapshot);
                in_flight.insert(step);
                tasks.spawn(
                    async move { (step, run_step(step, &ctx, &outputs).await) }
                        .instrument(info_span!("step", step = %step)),
                );
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok((step, Ok(output))) => {
                    in_flight.remove(&step);
                    progress.record(paths, output)?;
                }
                Ok((step, Err(source))) => {
                    in_flight.remove(&step);
                    let err = progress.fail(paths, step, source)?;
                    failure.get_or_insert(err);
                }
                Err(join_error) => {
                    error!(error = %join_error, "step task failed");
                    panicked.get_or_insert(join_error.to_string());
                }
            }
        }

        // Tasks that reported back were removed from `in_flight`; whatever
        // is left died without a result.
        if let (Some(message), Some(step)) = (panicked, in_flight.pop_first()) {
            if let (Some(journal), Some(paths)) = (progress.journal.as_deref_mut(), paths) {
                journal.append_failure(paths, step, message.clone())?;
            }
            failure.get_or_insert(ExecuteError::TaskFailed { step, message });
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Mark the unfinished run in `paths` abandoned.
///
/// Returns the abandoned journal so the caller can report the IDs left
/// behind for manual cleanup.
pub fn abandon(paths: &SeedPaths) -> Result<RunJournal, ExecuteError> {
    let _lock = RunLock::acquire(paths)?;
    let mut journal = RunJournal::read_optional(paths)?.ok_or(ExecuteError::NoRunToResume)?;
    if journal.phase.is_finished() {
        return Err(ExecuteError::NotResumable {
            run_id: journal.run_id,
            phase: journal.phase,
        });
    }
    journal.append_abandon(paths)?;
    let ids = journal.created_ids();
    warn!(run_id = %journal.run_id, count = ids.len(), "run abandoned; created entities are left in place");
    Ok(journal)
}
