//! core
//!
//! Core domain types, fixtures, configuration and run state.
//!
//! # Modules
//!
//! - [`types`] - Strong types: entity IDs, country and currency codes
//! - [`fixtures`] - Fixed seed literals: countries, templates, rule defaults
//! - [`random`] - Injectable random source
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Run journaling and locking
//! - [`paths`] - Centralized path routing for run state
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing here talks to the backend

pub mod config;
pub mod fixtures;
pub mod ops;
pub mod paths;
pub mod random;
pub mod types;
