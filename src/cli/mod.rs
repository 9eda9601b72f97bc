//! cli
//!
//! Command-line interface layer for mseed.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers
//! - Does NOT call the backend directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the [`crate::engine`] for execution. Every backend call flows through
//! the executor so it is locked and journaled.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::Result;

use crate::core::config::Config;
use crate::ui::{logging, output, output::Verbosity};

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// `--config`, if given
    pub config_path: Option<PathBuf>,
    pub verbosity: Verbosity,
    /// `--json`
    pub json: bool,
}

impl Context {
    /// Load configuration, printing any warnings.
    pub fn load_config(&self) -> Result<Config> {
        let result = Config::load(self.config_path.as_deref())?;
        for warning in &result.warnings {
            output::warn(
                format!("{}: {}", warning.path.display(), warning.message),
                self.verbosity,
            );
        }
        Ok(result.config)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        config_path: cli.config.clone(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        json: cli.json,
    };
    logging::init(ctx.verbosity);

    commands::dispatch(cli.command, &ctx).await
}
