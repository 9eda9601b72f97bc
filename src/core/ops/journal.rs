//! core::ops::journal
//!
//! Checkpoint journal for seed runs.
//!
//! # Crash Safety Contract
//!
//! 1. **Per-step persistence:** every `append_*` method and every phase
//!    transition writes the journal to disk with fsync before returning.
//! 2. **Recoverability:** after a crash, [`RunJournal::read`] returns the
//!    journal as it was after the last successful write. Steps listed as
//!    completed have their outputs in [`RunJournal::outputs`], so a resumed
//!    run skips them and feeds their outputs to the steps that remain.
//!
//! A step that failed or was interrupted mid-way is never listed as
//! completed. Its partial backend effects are not rolled back; the journal
//! only records the IDs of completed steps.
//!
//! # Storage
//!
//! - `<state_dir>/journal.json` - Journal of the current or last run
//! - `<state_dir>/seeded.json` - [`SeedMarker`], written when a run commits
//!
//! # Usage
//!
//! ```ignore
//! use marketseed::core::ops::journal::RunJournal;
//!
//! let mut journal = RunJournal::new(plan.digest(), Some(42));
//! journal.write(&paths)?;
//!
//! journal.append_step(&paths, StepId::SalesChannel, ids, &outputs)?;
//!
//! journal.append_commit(&paths)?;
//! SeedMarker::from_journal(&journal).write(&paths)?;
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::paths::SeedPaths;
use crate::core::types::UtcTimestamp;
use crate::engine::plan::StepId;
use crate::seed::SeedOutputs;

/// Errors from journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// I/O error reading or writing journal files.
    #[error("journal i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("journal json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Journal file not found.
    #[error("journal not found: {0}")]
    NotFound(String),

    /// Invalid journal state.
    #[error("invalid journal state: {0}")]
    InvalidState(String),
}

/// Unique identifier for a seed run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new unique run id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a RunId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The current phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Steps are executing, or the process died while they were.
    InProgress,
    /// A step failed; the run stopped.
    Failed,
    /// Every step completed.
    Committed,
    /// The operator gave up on the run.
    Abandoned,
}

impl RunPhase {
    /// Committed or abandoned.
    pub fn is_finished(&self) -> bool {
        matches!(self, RunPhase::Committed | RunPhase::Abandoned)
    }

    /// Whether `mseed resume` can pick the run up.
    pub fn is_resumable(&self) -> bool {
        matches!(self, RunPhase::InProgress | RunPhase::Failed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::InProgress => "in_progress",
            RunPhase::Failed => "failed",
            RunPhase::Committed => "committed",
            RunPhase::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A step that finished, with the IDs of the entities it created or
/// updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStep {
    pub step: StepId,
    #[serde(default)]
    pub ids: Vec<String>,
    pub finished_at: UtcTimestamp,
}

/// The step that stopped a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: StepId,
    pub message: String,
    pub failed_at: UtcTimestamp,
}

/// Persisted state of a seed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunJournal {
    pub run_id: RunId,
    /// Digest of the plan the run executes.
    pub plan_digest: String,
    pub phase: RunPhase,
    /// Seed of the random source, if the run was seeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    pub started_at: UtcTimestamp,
    pub updated_at: UtcTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<UtcTimestamp>,
    /// Completed steps, in completion order.
    #[serde(default)]
    pub completed: Vec<CompletedStep>,
    /// The most recent failure. Cleared when the run resumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Accumulated outputs of the completed steps.
    #[serde(default)]
    pub outputs: SeedOutputs,
}

impl RunJournal {
    /// Create an in-progress journal. Nothing is written yet.
    pub fn new(plan_digest: impl Into<String>, random_seed: Option<u64>) -> Self {
        let now = UtcTimestamp::now();
        Self {
            run_id: RunId::new(),
            plan_digest: plan_digest.into(),
            phase: RunPhase::InProgress,
            random_seed,
            started_at: now.clone(),
            updated_at: now,
            finished_at: None,
            completed: Vec::new(),
            failure: None,
            outputs: SeedOutputs::default(),
        }
    }

    pub fn is_completed(&self, step: StepId) -> bool {
        self.completed.iter().any(|c| c.step == step)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.completed.iter().map(|c| c.step)
    }

    /// Every ID recorded by a completed step, in completion order.
    pub fn created_ids(&self) -> Vec<(StepId, &str)> {
        self.completed
            .iter()
            .flat_map(|c| c.ids.iter().map(move |id| (c.step, id.as_str())))
            .collect()
    }

    /// Record a completed step and the outputs so far, then persist.
    pub fn append_step(
        &mut self,
        paths: &SeedPaths,
        step: StepId,
        ids: Vec<String>,
        outputs: &SeedOutputs,
    ) -> Result<(), JournalError> {
        if self.is_completed(step) {
            return Err(JournalError::InvalidState(format!(
                "step '{}' is already recorded as completed",
                step
            )));
        }
        let now = UtcTimestamp::now();
        self.completed.push(CompletedStep {
            step,
            ids,
            finished_at: now.clone(),
        });
        self.outputs = outputs.clone();
        self.updated_at = now;
        self.write(paths)
    }

    /// Record a failed step, move to `failed`, then persist.
    pub fn append_failure(
        &mut self,
        paths: &SeedPaths,
        step: StepId,
        message: impl Into<String>,
    ) -> Result<(), JournalError> {
        let now = UtcTimestamp::now();
        self.failure = Some(StepFailure {
            step,
            message: message.into(),
            failed_at: now.clone(),
        });
        self.phase = RunPhase::Failed;
        self.updated_at = now;
        self.write(paths)
    }

    /// Move a failed or interrupted run back to `in_progress`, then persist.
    pub fn append_resume(&mut self, paths: &SeedPaths) -> Result<(), JournalError> {
        if !self.phase.is_resumable() {
            return Err(JournalError::InvalidState(format!(
                "cannot resume a {} run",
                self.phase
            )));
        }
        self.phase = RunPhase::InProgress;
        self.failure = None;
        self.updated_at = UtcTimestamp::now();
        self.write(paths)
    }

    /// Mark the run committed, then persist.
    pub fn append_commit(&mut self, paths: &SeedPaths) -> Result<(), JournalError> {
        self.finish(RunPhase::Committed);
        self.write(paths)
    }

    /// Mark the run abandoned, then persist.
    pub fn append_abandon(&mut self, paths: &SeedPaths) -> Result<(), JournalError> {
        if self.phase.is_finished() {
            return Err(JournalError::InvalidState(format!(
                "run {} is already {}",
                self.run_id, self.phase
            )));
        }
        self.finish(RunPhase::Abandoned);
        self.write(paths)
    }

    fn finish(&mut self, phase: RunPhase) {
        let now = UtcTimestamp::now();
        self.phase = phase;
        self.updated_at = now.clone();
        self.finished_at = Some(now);
    }

    /// Write the journal to disk with fsync.
    ///
    /// # Fault Injection
    ///
    /// When compiled with `cfg(test)` or the `fault_injection` feature,
    /// this method can simulate crashes for testing recovery.
    /// Use [`fault_injection::set_crash_after`] to configure.
    pub fn write(&self, paths: &SeedPaths) -> Result<(), JournalError> {
        #[cfg(any(test, feature = "fault_injection"))]
        if fault_injection::should_crash() {
            return Err(JournalError::Io(std::io::Error::other(
                "simulated crash for fault injection testing",
            )));
        }

        write_synced(paths.state_dir(), &paths.journal_path(), self)
    }

    /// Read the journal from disk.
    pub fn read(paths: &SeedPaths) -> Result<Self, JournalError> {
        Self::read_optional(paths)?
            .ok_or_else(|| JournalError::NotFound(paths.journal_path().display().to_string()))
    }

    /// Read the journal, if one exists.
    pub fn read_optional(paths: &SeedPaths) -> Result<Option<Self>, JournalError> {
        let path = paths.journal_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Marker left behind by a committed run.
///
/// Its presence makes `mseed run` refuse to seed again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMarker {
    pub run_id: RunId,
    pub plan_digest: String,
    pub committed_at: UtcTimestamp,
}

impl SeedMarker {
    pub fn from_journal(journal: &RunJournal) -> Self {
        Self {
            run_id: journal.run_id.clone(),
            plan_digest: journal.plan_digest.clone(),
            committed_at: journal
                .finished_at
                .clone()
                .unwrap_or_else(UtcTimestamp::now),
        }
    }

    /// Write the marker to disk with fsync.
    pub fn write(&self, paths: &SeedPaths) -> Result<(), JournalError> {
        write_synced(paths.state_dir(), &paths.marker_path(), self)
    }

    /// Read the marker, if it exists.
    pub fn read(paths: &SeedPaths) -> Result<Option<Self>, JournalError> {
        let path = paths.marker_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn exists(paths: &SeedPaths) -> bool {
        paths.marker_path().exists()
    }
}

fn write_synced<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<(), JournalError> {
    fs::create_dir_all(dir)?;
    let content = serde_json::to_string_pretty(value)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Simulated journal write failures, for recovery tests.
#[cfg(any(test, feature = "fault_injection"))]
pub mod fault_injection {
    use std::cell::Cell;

    // Per-thread state so parallel tests do not interfere.
    thread_local! {
        /// Fail the Nth write; 0 disables.
        static CRASH_AFTER_WRITES: Cell<usize> = const { Cell::new(0) };
        static WRITE_COUNT: Cell<usize> = const { Cell::new(0) };
    }

    /// Make the `n`th journal write from now on fail. 0 disables.
    pub fn set_crash_after(n: usize) {
        CRASH_AFTER_WRITES.with(|c| c.set(n));
        WRITE_COUNT.with(|c| c.set(0));
    }

    /// Called by [`RunJournal::write`](super::RunJournal::write) before
    /// each write.
    pub fn should_crash() -> bool {
        CRASH_AFTER_WRITES.with(|threshold_cell| {
            let threshold = threshold_cell.get();
            if threshold == 0 {
                return false;
            }
            WRITE_COUNT.with(|count_cell| {
                let count = count_cell.get() + 1;
                count_cell.set(count);
                count >= threshold
            })
        })
    }

    pub fn reset() {
        CRASH_AFTER_WRITES.with(|c| c.set(0));
        WRITE_COUNT.with(|c| c.set(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::model::SalesChannel;
    use crate::core::types::SalesChannelId;
    use tempfile::TempDir;

    fn create_test_paths(temp: &TempDir) -> SeedPaths {
        SeedPaths::new(temp.path().join("state"))
    }

    fn outputs_with_channel() -> SeedOutputs {
        SeedOutputs {
            sales_channel: Some(SalesChannel {
                id: SalesChannelId::new("sc_1").unwrap(),
                name: "Default Sales Channel".into(),
                description: None,
                is_disabled: false,
            }),
            ..SeedOutputs::default()
        }
    }

    mod run_id {
        use super::*;

        #[test]
        fn new_generates_unique_ids() {
            assert_ne!(RunId::new(), RunId::new());
        }

        #[test]
        fn display_formatting() {
            assert_eq!(RunId::from_string("run-1").to_string(), "run-1");
        }
    }

    mod run_phase {
        use super::*;

        #[test]
        fn finished_and_resumable_are_disjoint() {
            for phase in [
                RunPhase::InProgress,
                RunPhase::Failed,
                RunPhase::Committed,
                RunPhase::Abandoned,
            ] {
                assert!(!(phase.is_finished() && phase.is_resumable()), "{phase}");
            }
            assert!(RunPhase::Failed.is_resumable());
            assert!(RunPhase::Committed.is_finished());
        }

        #[test]
        fn serializes_snake_case() {
            let json = serde_json::to_string(&RunPhase::InProgress).unwrap();
            assert_eq!(json, "\"in_progress\"");
        }
    }

    mod persistence {
        use super::*;

        #[test]
        fn read_missing_is_not_found() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);

            assert!(matches!(
                RunJournal::read(&paths),
                Err(JournalError::NotFound(_))
            ));
            assert!(RunJournal::read_optional(&paths).unwrap().is_none());
        }

        #[test]
        fn append_step_persists_outputs() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);

            let mut journal = RunJournal::new("sha256:abc", Some(7));
            journal.write(&paths).unwrap();
            journal
                .append_step(
                    &paths,
                    StepId::SalesChannel,
                    vec!["sc_1".into()],
                    &outputs_with_channel(),
                )
                .unwrap();

            let loaded = RunJournal::read(&paths).unwrap();
            assert_eq!(loaded.run_id, journal.run_id);
            assert_eq!(loaded.random_seed, Some(7));
            assert!(loaded.is_completed(StepId::SalesChannel));
            assert_eq!(loaded.outputs, outputs_with_channel());
            assert_eq!(loaded.created_ids(), vec![(StepId::SalesChannel, "sc_1")]);
        }

        #[test]
        fn step_cannot_complete_twice() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);

            let mut journal = RunJournal::new("sha256:abc", None);
            let outputs = SeedOutputs::default();
            journal
                .append_step(&paths, StepId::Region, vec![], &outputs)
                .unwrap();
            let err = journal
                .append_step(&paths, StepId::Region, vec![], &outputs)
                .unwrap_err();
            assert!(matches!(err, JournalError::InvalidState(_)));
        }

        #[test]
        fn failure_then_resume_clears_failure() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);

            let mut journal = RunJournal::new("sha256:abc", None);
            journal
                .append_failure(&paths, StepId::Seller, "rejected (409): exists")
                .unwrap();
            let loaded = RunJournal::read(&paths).unwrap();
            assert_eq!(loaded.phase, RunPhase::Failed);
            assert_eq!(loaded.failure.as_ref().unwrap().step, StepId::Seller);

            journal.append_resume(&paths).unwrap();
            let loaded = RunJournal::read(&paths).unwrap();
            assert_eq!(loaded.phase, RunPhase::InProgress);
            assert!(loaded.failure.is_none());
        }

        #[test]
        fn finished_runs_cannot_be_abandoned_or_resumed() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);

            let mut journal = RunJournal::new("sha256:abc", None);
            journal.append_commit(&paths).unwrap();
            assert!(journal.finished_at.is_some());
            assert!(matches!(
                journal.append_abandon(&paths),
                Err(JournalError::InvalidState(_))
            ));
            assert!(matches!(
                journal.append_resume(&paths),
                Err(JournalError::InvalidState(_))
            ));
        }

        #[test]
        fn marker_round_trips_from_committed_journal() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);
            assert!(!SeedMarker::exists(&paths));

            let mut journal = RunJournal::new("sha256:abc", None);
            journal.append_commit(&paths).unwrap();
            let marker = SeedMarker::from_journal(&journal);
            marker.write(&paths).unwrap();

            assert!(SeedMarker::exists(&paths));
            assert_eq!(SeedMarker::read(&paths).unwrap(), Some(marker));
        }
    }

    mod fault_injection_tests {
        use super::*;

        #[test]
        fn crash_on_second_write_keeps_first() {
            let temp = TempDir::new().unwrap();
            let paths = create_test_paths(&temp);
            fault_injection::set_crash_after(2);

            let mut journal = RunJournal::new("sha256:abc", None);
            journal.write(&paths).unwrap();
            let err = journal
                .append_step(&paths, StepId::Region, vec!["reg_1".into()], &SeedOutputs::default())
                .unwrap_err();
            fault_injection::reset();

            assert!(matches!(err, JournalError::Io(_)));
            let loaded = RunJournal::read(&paths).unwrap();
            assert!(loaded.completed.is_empty());
        }
    }
}
