//! status command - Show the current or last run

use anyhow::Result;
use serde::Serialize;

use crate::cli::Context;
use crate::core::ops::journal::{RunJournal, SeedMarker};
use crate::ui::output;

#[derive(Serialize)]
struct Status {
    seeded: Option<SeedMarker>,
    journal: Option<RunJournal>,
}

/// Show the seeded marker and the journal of the latest run.
pub fn status(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let paths = config.seed_paths();
    let status = Status {
        seeded: SeedMarker::read(&paths)?,
        journal: RunJournal::read_optional(&paths)?,
    };

    if ctx.json {
        output::print_json(&status)?;
        return Ok(());
    }

    match &status.seeded {
        Some(marker) => println!(
            "Seeded by run {} at {} (plan {})",
            marker.run_id, marker.committed_at, marker.plan_digest
        ),
        None => println!("Not seeded ({})", paths.state_dir().display()),
    }
    match &status.journal {
        Some(journal) => {
            println!("{}", output::format_journal(journal));
            if journal.phase.is_resumable() {
                println!("continue with 'mseed resume' or give up with 'mseed abandon'");
            }
        }
        None => println!("No run recorded"),
    }
    Ok(())
}
