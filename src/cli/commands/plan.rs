//! plan command - Show the steps and their ordering

use anyhow::Result;
use serde::Serialize;

use crate::cli::Context;
use crate::engine::{SeedPlan, StepId};
use crate::ui::output;

#[derive(Serialize)]
struct PlanView {
    digest: String,
    layers: Vec<Vec<StepId>>,
    order: Vec<StepId>,
}

/// Print the dependency layers and sequential order of the seed plan.
pub fn plan(ctx: &Context) -> Result<()> {
    let plan = SeedPlan::full()?;
    let view = PlanView {
        digest: plan.digest(),
        layers: plan.layers()?,
        order: plan.sequential_order()?,
    };

    if ctx.json {
        output::print_json(&view)?;
    } else {
        println!("{}", output::format_plan(&plan, &view.layers, &view.order));
    }
    Ok(())
}
