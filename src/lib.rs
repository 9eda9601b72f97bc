//! marketseed - seed pipeline for a multi-vendor commerce platform
//!
//! Provisions a fresh marketplace with its initial dataset: sales channel,
//! region and tax regions, publishable key, a seller with stock location,
//! service zone and shipping option, catalog taxonomies, products, stock
//! levels, commission and configuration rules.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Step graph, executor, checkpoint and resume
//! - [`seed`] - The seed steps themselves
//! - [`backend`] - Abstraction over the commerce backend (HTTP, in-memory)
//! - [`core`] - Domain types, fixtures, configuration and run state
//! - [`ui`] - Output and logging setup
//!
//! # Correctness Invariants
//!
//! 1. A step starts only after the steps whose outputs it consumes
//! 2. Every completed step is journaled before the next layer starts
//! 3. A committed run is never repeated without `--force`
//! 4. Backend errors surface unchanged, with the IDs created so far

pub mod backend;
pub mod cli;
pub mod core;
pub mod engine;
pub mod seed;
pub mod ui;
