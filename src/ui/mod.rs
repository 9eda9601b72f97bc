//! ui
//!
//! Operator-facing output and logging setup.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`logging`] - `tracing` subscriber initialisation
//!
//! # Design
//!
//! Human-readable summaries go to stdout through [`output`]; diagnostic
//! events go to stderr through `tracing`, so `--json` output stays clean.

pub mod logging;
pub mod output;
