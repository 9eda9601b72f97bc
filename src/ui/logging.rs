//! ui::logging
//!
//! `tracing` subscriber setup for the binary.
//!
//! `RUST_LOG` is honoured unless `--debug` or `--quiet` forces a level.
//! Events go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::Verbosity;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "marketseed=info";

/// The filter directive for a verbosity, or `None` to defer to the
/// environment.
pub fn forced_directive(verbosity: Verbosity) -> Option<&'static str> {
    match verbosity {
        Verbosity::Debug => Some("marketseed=debug"),
        Verbosity::Quiet => Some("marketseed=warn"),
        Verbosity::Normal => None,
    }
}

pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    match forced_directive(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbosity))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
