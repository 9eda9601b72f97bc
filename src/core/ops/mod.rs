//! core::ops
//!
//! Run journaling and locking.
//!
//! # Modules
//!
//! - [`journal`] - Checkpoint journal and committed-run marker
//! - [`lock`] - Exclusive run lock
//!
//! # Architecture
//!
//! Every run:
//! 1. Acquires the exclusive run lock
//! 2. Writes the journal before the first backend call
//! 3. Appends each completed step with its created IDs and outputs
//! 4. On success: marks the journal committed and writes the marker
//! 5. On failure: records the failing step; `resume` continues from there

pub mod journal;
pub mod lock;

pub use journal::{
    CompletedStep, JournalError, RunId, RunJournal, RunPhase, SeedMarker, StepFailure,
};
pub use lock::{LockError, RunLock};
