use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use pepe_core::plan::{PlanRepository, demo_plans};
use pepe_core::session::DraftRepository;
use pepe_core::runner::{flatten_workout_plan, format_kg};

use super::find_plan;
use crate::app::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let plans = ctx.store.list_all().await?;
    if plans.is_empty() {
        println!("{}", "No plans yet. Run `pepe plans seed` to add the demo plans.".bright_black());
        return Ok(());
    }

    for plan in plans {
        println!(
            "{}  {}  {}",
            plan.id.bright_black(),
            plan.day_label.bold(),
            format!("{} exercises, {} sets", plan.exercises.len(), plan.set_count()).bright_black()
        );
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, plan_id: &str) -> Result<()> {
    let plan = find_plan(ctx, plan_id).await?;

    println!("{}", plan.day_label.bright_magenta().bold());
    if let Some(notes) = &plan.notes {
        println!("{}", notes.bright_black());
    }

    let mut current_exercise = None;
    for step in flatten_workout_plan(&plan) {
        if current_exercise.as_deref() != Some(step.exercise_id.as_str()) {
            let group = step
                .superset_group_id
                .as_deref()
                .map(|g| format!(" (superset {g})"))
                .unwrap_or_default();
            println!("{}{}", step.exercise_name.bold(), group.cyan());
            current_exercise = Some(step.exercise_id.clone());
        }

        let weight = step
            .target_weight_kg
            .map(|kg| format!(" @ {} kg", format_kg(kg)))
            .unwrap_or_default();
        println!(
            "  {:>2}. set {}/{} {} x{}{}  rest {}s",
            step.index + 1,
            step.set_order,
            step.exercise_set_count,
            step.set_type.label(),
            step.target_reps,
            weight,
            step.rest_after_seconds
        );
    }
    Ok(())
}

/// Adds the demo plans, replacing earlier copies with the same label.
pub async fn seed(ctx: &AppContext) -> Result<()> {
    let existing = ctx.store.list_all().await?;
    for mut plan in demo_plans(Utc::now()) {
        if let Some(old) = existing.iter().find(|p| p.day_label == plan.day_label) {
            plan.id = old.id.clone();
        }
        ctx.store
            .save(&plan)
            .await
            .with_context(|| format!("Failed to save plan {}", plan.day_label))?;
        println!("{} {}", "Saved".green(), plan.day_label);
    }
    Ok(())
}

/// Deletes a plan. Its completed sessions stay in the history.
pub async fn delete(ctx: &AppContext, plan_id: &str) -> Result<()> {
    let plan = find_plan(ctx, plan_id).await?;
    ctx.store
        .delete(&plan.id)
        .await
        .with_context(|| format!("Failed to delete plan {}", plan.day_label))?;
    println!("{} {}", "Deleted".yellow(), plan.day_label);

    if let Some(draft) = ctx.store.load_draft().await? {
        if draft.plan_id == plan.id {
            println!(
                "{}",
                "The stored session used this plan and can no longer be resumed. Run `pepe discard` to remove it."
                    .yellow()
            );
        }
    }
    Ok(())
}
