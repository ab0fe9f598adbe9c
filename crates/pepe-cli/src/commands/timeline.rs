use anyhow::Result;
use colored::Colorize;
use pepe_application::CoachPlayer;
use pepe_core::runner::{build_coach_timeline, flatten_workout_plan};
use tokio_util::sync::CancellationToken;

use super::find_plan;
use crate::app::AppContext;

pub async fn print(ctx: &AppContext, plan_id: &str, json: bool) -> Result<()> {
    let plan = find_plan(ctx, plan_id).await?;
    let timeline = build_coach_timeline(&flatten_workout_plan(&plan));

    if json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    for cue in &timeline.cues {
        println!(
            "{:>5}s  {:<16} {}",
            cue.offset_sec,
            cue.cue_type.as_str().bright_black(),
            cue.text
        );
    }
    println!(
        "{}",
        format!("Estimated total: {}", minutes(timeline.estimated_total_sec)).bold()
    );
    Ok(())
}

/// Plays the timeline in real time until it ends or Ctrl-C is pressed.
pub async fn listen(ctx: &AppContext, plan_id: &str) -> Result<()> {
    let plan = find_plan(ctx, plan_id).await?;
    let timeline = build_coach_timeline(&flatten_workout_plan(&plan));
    if timeline.is_empty() {
        println!("{}", "This plan has no sets.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Listening to {} ({}). Ctrl-C to stop.", plan.day_label, minutes(timeline.estimated_total_sec))
            .bright_magenta()
    );

    let player = CoachPlayer::new(ctx.speech(), ctx.config.voice.locale.clone());
    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    let summary = player.play(&timeline, cancel).await;
    if summary.completed {
        println!("{}", "Done.".bright_green());
    } else {
        println!("{}", format!("Stopped after {} cues.", summary.spoken).yellow());
    }
    Ok(())
}

fn minutes(seconds: u32) -> String {
    format!("{}m {:02}s", seconds / 60, seconds % 60)
}
