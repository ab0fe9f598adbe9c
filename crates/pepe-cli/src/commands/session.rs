use std::sync::Arc;

use anyhow::{Result, bail};
use colored::Colorize;
use pepe_core::error::PepeError;

use super::find_plan;
use crate::app::AppContext;
use crate::repl;

pub async fn run(ctx: &AppContext, plan_id: &str) -> Result<()> {
    let plan = find_plan(ctx, plan_id).await?;

    let runner = Arc::new(ctx.runner());
    if let Some(draft) = runner.stored_draft().await? {
        println!(
            "{}",
            format!(
                "Replacing the unfinished {} session from {}.",
                draft.plan_label,
                draft.started_at.format("%Y-%m-%d %H:%M")
            )
            .yellow()
        );
    }

    let first = runner.start(&plan.id).await?;
    repl::run_session(runner, first).await
}

pub async fn resume(ctx: &AppContext) -> Result<()> {
    let runner = Arc::new(ctx.runner());
    let first = match runner.resume().await {
        Ok(snapshot) => snapshot,
        Err(PepeError::NoDraft) => {
            println!("{}", "There is no session to resume. Start one with `pepe run <plan-id>`.".yellow());
            return Ok(());
        }
        Err(PepeError::StaleDraft { plan_id }) => {
            bail!(
                "The stored session belongs to plan '{}', which no longer exists. Run `pepe discard` to remove it.",
                plan_id
            );
        }
        Err(e) => return Err(e.into()),
    };
    repl::run_session(runner, first).await
}

pub async fn discard(ctx: &AppContext) -> Result<()> {
    let runner = ctx.runner();
    if runner.stored_draft().await?.is_none() {
        println!("{}", "There is no stored session.".bright_black());
        return Ok(());
    }
    runner.discard().await?;
    println!("{}", "Stored session discarded.".yellow());
    Ok(())
}
