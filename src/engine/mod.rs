//! engine
//!
//! Orchestrates a seed run: Plan -> Execute -> Journal.
//!
//! # Architecture
//!
//! 1. **Plan**: the fixed step set and its data dependencies ([`plan`])
//!    validated as a DAG ([`graph`])
//! 2. **Execute**: the [`exec::Executor`] schedules steps by dependency
//!    layer and dispatches each through [`step::run_step`]
//! 3. **Journal**: every completed step is checkpointed so a failed run
//!    resumes where it stopped
//!
//! # Invariants
//!
//! - A step starts only after every step it depends on has completed
//! - Steps never share mutable state; outputs are merged by the executor
//! - Only the executor writes the journal

pub mod exec;
pub mod graph;
pub mod plan;
pub mod step;

pub use exec::{abandon, ExecuteError, ExecutedStep, Executor, RunOptions, RunReport};
pub use graph::{GraphError, StepGraph};
pub use plan::{SeedPlan, StepId};
pub use step::{run_step, StepContext, StepOutput};
