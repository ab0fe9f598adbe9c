//! Coach text formatter.
//!
//! Produces the one-line status shown on screen for the runner's state.
//! Pure and cheap; safe to call on every render.

use super::step::RunnerStep;
use crate::session::RunnerPhase;

const DONE_TEXT: &str = "Session complete. Review your logs and finish to save it to history.";

/// Formats the coach line for the given state.
///
/// `next` is only used in the rest phase, where the line announces the
/// upcoming exercise.
pub fn coach_text(
    current: Option<&RunnerStep>,
    next: Option<&RunnerStep>,
    phase: RunnerPhase,
    rest_remaining: u32,
) -> String {
    match (phase, current) {
        (RunnerPhase::Done, _) | (_, None) => DONE_TEXT.to_string(),
        (RunnerPhase::Rest, Some(_)) => match next {
            Some(next) => format!(
                "Rest: {rest_remaining}s. Get ready for {}.",
                next.exercise_name
            ),
            None => format!("Rest: {rest_remaining}s."),
        },
        (_, Some(step)) => set_text(step),
    }
}

fn set_text(step: &RunnerStep) -> String {
    let mut out = format!(
        "Set {}/{} [{}] of {}",
        step.set_order,
        step.exercise_set_count,
        step.set_type.label(),
        step.exercise_name
    );
    if let Some(group) = &step.superset_group_id {
        out.push_str(&format!(" (superset {group})"));
    }
    if step.drop_set_group_id.is_some() {
        out.push_str(" (drop set)");
    }
    out.push_str(&format!(": target {} reps", step.target_reps));
    if let Some(weight) = step.target_weight_kg {
        out.push_str(&format!(" at {} kg", format_kg(weight)));
    }
    out.push('.');

    if let Some(rpe) = step.target_rpe {
        out.push_str(&format!(" RPE {}.", format_decimal(rpe)));
    } else if let Some(rir) = step.target_rir {
        out.push_str(&format!(" RIR {}.", format_decimal(rir)));
    }
    if let Some(tempo) = &step.target_tempo {
        out.push_str(&format!(" Tempo {tempo}."));
    }
    out.push_str(" Move with control.");
    if let Some(notes) = &step.set_notes {
        out.push_str(&format!(" Note: {notes}."));
    }
    out
}

/// Formats a weight without trailing zeros ("60", "62.5").
pub fn format_kg(weight: f64) -> String {
    format_decimal(weight)
}

pub(crate) fn format_decimal(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
