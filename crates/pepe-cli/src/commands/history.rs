use anyhow::Result;
use colored::Colorize;
use pepe_core::analytics::{exercise_pr_stats, exercise_volume_stats, weekly_training_stats};
use pepe_core::runner::format_kg;
use pepe_core::session::SessionRepository;

use crate::app::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.store.list_sessions().await?;
    if sessions.is_empty() {
        println!("{}", "No completed sessions yet.".bright_black());
        return Ok(());
    }

    for session in sessions {
        let duration = session.duration_seconds();
        println!(
            "{}  {}  {} sets  {}m {:02}s",
            session.started_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            session.workout_plan_label.bold(),
            session.set_logs.len(),
            duration / 60,
            duration % 60
        );
    }
    Ok(())
}

pub async fn stats(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.store.list_sessions().await?;
    if sessions.is_empty() {
        println!("{}", "No completed sessions yet.".bright_black());
        return Ok(());
    }

    println!("{}", "Consistency".bright_magenta().bold());
    for week in weekly_training_stats(&sessions) {
        println!("  {}  {} day(s)", week.week_key, week.days_trained);
    }

    println!("{}", "Volume".bright_magenta().bold());
    for volume in exercise_volume_stats(&sessions) {
        println!("  {:<28} {} kg", volume.exercise_name, format_kg(volume.total_volume));
    }

    println!("{}", "Personal records".bright_magenta().bold());
    for pr in exercise_pr_stats(&sessions) {
        let best = match pr.best_reps_at_weight {
            Some((kg, reps)) => format!("{} kg x{}", format_kg(kg), reps),
            None => "bodyweight".to_string(),
        };
        println!("  {:<28} {}", pr.exercise_name, best);
    }
    Ok(())
}
