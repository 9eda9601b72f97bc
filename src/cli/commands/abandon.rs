//! abandon command - Give up on an unfinished run

use anyhow::Result;

use crate::cli::Context;
use crate::engine;
use crate::ui::output;

/// Mark the unfinished run abandoned and list the IDs it created.
pub fn abandon(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let journal = engine::abandon(&config.seed_paths())?;

    if ctx.json {
        output::print_json(&journal)?;
        return Ok(());
    }

    output::print(format!("Abandoned run {}", journal.run_id), ctx.verbosity);
    if journal.completed.iter().all(|c| c.ids.is_empty()) {
        output::print("Nothing was created.", ctx.verbosity);
    } else {
        // Cleanup needs these even in quiet mode.
        println!("Created entities (not deleted):");
        println!("{}", output::format_created_ids(&journal));
    }
    Ok(())
}
