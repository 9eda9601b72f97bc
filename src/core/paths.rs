//! core::paths
//!
//! Centralized path routing for seed run state.
//!
//! # Storage Layout
//!
//! Everything lives under the configured state directory (`run.state_dir`,
//! default `.mseed`):
//! - `lock` - Exclusive run lock
//! - `journal.json` - Checkpoint journal of the current or last run
//! - `seeded.json` - Marker written when a run commits
//!
//! No code outside this module should join file names onto the state
//! directory.
//!
//! # Example
//!
//! ```
//! use marketseed::core::paths::SeedPaths;
//! use std::path::PathBuf;
//!
//! let paths = SeedPaths::new("/srv/app/.mseed");
//! assert_eq!(
//!     paths.journal_path(),
//!     PathBuf::from("/srv/app/.mseed/journal.json")
//! );
//! ```

use std::path::{Path, PathBuf};

/// Default state directory, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".mseed";

/// Path routing for the files a seed run owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPaths {
    state_dir: PathBuf,
}

impl SeedPaths {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// The state directory itself.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Exclusive lock file: `<state_dir>/lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("lock")
    }

    /// Checkpoint journal: `<state_dir>/journal.json`.
    pub fn journal_path(&self) -> PathBuf {
        self.state_dir.join("journal.json")
    }

    /// Committed run marker: `<state_dir>/seeded.json`.
    pub fn marker_path(&self) -> PathBuf {
        self.state_dir.join("seeded.json")
    }
}

impl Default for SeedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_paths_live_under_state_dir() {
        let paths = SeedPaths::new("/tmp/state");
        for path in [paths.lock_path(), paths.journal_path(), paths.marker_path()] {
            assert!(path.starts_with("/tmp/state"));
        }
    }

    #[test]
    fn default_is_relative_dot_dir() {
        let paths = SeedPaths::default();
        assert_eq!(paths.state_dir(), Path::new(".mseed"));
        assert_eq!(paths.lock_path(), PathBuf::from(".mseed/lock"));
    }
}
