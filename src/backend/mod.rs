//! backend
//!
//! Abstraction over the commerce platform being seeded.
//!
//! # Architecture
//!
//! The `Backend` trait is the only way seed steps touch the platform. It is
//! passed explicitly to every step; there is no process-wide container.
//! Commands obtain one through [`create_backend`].
//!
//! # Modules
//!
//! - `traits`: the `Backend` trait, `BackendError` and `BackendOp`
//! - [`model`]: entities returned by the platform
//! - [`requests`]: typed, validated call inputs
//! - [`links`]: cross-module link records
//! - [`http`]: bootstrap-bridge client
//! - [`memory`]: in-process backend for tests and dry runs
//! - `factory`: backend selection

mod factory;
pub mod http;
pub mod links;
pub mod memory;
pub mod model;
pub mod requests;
mod traits;

pub use factory::{create_backend, valid_backend_names, BackendKind};
pub use http::HttpBackend;
pub use memory::InMemoryBackend;
pub use traits::*;
