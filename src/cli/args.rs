//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mseed - seed a multi-vendor commerce backend with its initial dataset
#[derive(Parser, Debug)]
#[command(name = "mseed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: $MSEED_CONFIG, ./mseed.toml, then user config)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; only warnings and errors are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the seed pipeline
    #[command(
        name = "run",
        long_about = "Run the seed pipeline against the configured backend.\n\n\
            Steps run in dependency order; independent steps run concurrently up to \
            run.max_parallel. Every completed step is checkpointed in the state \
            directory. A backend is seeded once: after a committed run, 'mseed run' \
            refuses unless --force is given.",
        after_help = "\
EXAMPLES:
    # Preview the whole pipeline against an in-memory backend
    mseed run --dry-run

    # Seed with a reproducible catalog
    mseed run --seed 42

    # One step at a time, in reference order
    mseed run --sequential

IF A STEP FAILS:
    mseed status     # see what was created and what failed
    mseed resume     # continue from the failed step
    mseed abandon    # give up; prints the IDs left behind"
    )]
    Run {
        /// Run against a fresh in-memory backend; nothing is written
        #[arg(long)]
        dry_run: bool,

        /// Seed again even if a previous run committed
        #[arg(long)]
        force: bool,

        /// Run one step at a time in reference order
        #[arg(long)]
        sequential: bool,

        /// Seed for catalog assignment and stock quantities
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Continue a failed or interrupted run
    #[command(
        name = "resume",
        long_about = "Continue the run recorded in the state directory.\n\n\
            Completed steps are skipped and their outputs restored from the journal. \
            The plan must be unchanged since the run started."
    )]
    Resume {
        /// Run one step at a time in reference order
        #[arg(long)]
        sequential: bool,
    },

    /// Give up on an unfinished run
    #[command(
        name = "abandon",
        long_about = "Mark the unfinished run abandoned and print the IDs it created.\n\n\
            Nothing is deleted from the backend; the IDs are for manual cleanup. \
            After abandoning, 'mseed run' starts a fresh run."
    )]
    Abandon,

    /// Show the state of the current or last run
    Status,

    /// Show the steps, their dependency layers and the sequential order
    Plan,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    mseed completion bash > ~/.local/share/bash-completion/completions/mseed
    mseed completion zsh > ~/.zfunc/_mseed
    mseed completion fish > ~/.config/fish/completions/mseed.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported by `mseed completion`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from(["mseed", "--json", "run", "--dry-run", "--seed", "7"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Run {
                dry_run,
                force,
                sequential,
                seed,
            } => {
                assert!(dry_run);
                assert!(!force);
                assert!(!sequential);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mseed", "status", "-q", "--config", "x.toml"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["mseed"]).is_err());
    }
}
