//! Coach timeline builder.
//!
//! Precomputes the narration cues for "listen" mode. The timeline is a pure
//! function of the steps and is not the clock that drives a live session.

use serde::{Deserialize, Serialize};

use super::step::RunnerStep;
use super::text::format_kg;

const TIMELINE_VERSION: u32 = 1;
const MIN_SET_SECONDS: u32 = 25;
const MAX_SET_SECONDS: u32 = 75;
const SECONDS_PER_REP: f64 = 3.5;
const REST_WARNING_SECONDS: u32 = 10;

/// Kind of narration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachCueType {
    ExerciseStart,
    SetStart,
    WeightReminder,
    Encouragement,
    RestStart,
    #[serde(rename = "rest_10_left")]
    Rest10Left,
    NextSet,
}

impl CoachCueType {
    pub fn as_str(self) -> &'static str {
        match self {
            CoachCueType::ExerciseStart => "exercise_start",
            CoachCueType::SetStart => "set_start",
            CoachCueType::WeightReminder => "weight_reminder",
            CoachCueType::Encouragement => "encouragement",
            CoachCueType::RestStart => "rest_start",
            CoachCueType::Rest10Left => "rest_10_left",
            CoachCueType::NextSet => "next_set",
        }
    }
}

/// A single time-indexed narration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachTimelineCue {
    pub id: String,
    /// Seconds from session start.
    pub offset_sec: u32,
    #[serde(rename = "type")]
    pub cue_type: CoachCueType,
    pub step_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachTimeline {
    pub version: u32,
    pub estimated_total_sec: u32,
    pub cues: Vec<CoachTimelineCue>,
}

impl CoachTimeline {
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Builds the coach timeline for a flattened step list.
///
/// Deterministic: no randomness and no clock reads.
pub fn build_coach_timeline(steps: &[RunnerStep]) -> CoachTimeline {
    let mut cues = Vec::new();
    let mut offset: u32 = 0;
    let mut last_exercise_id: Option<&str> = None;
    let mut last_weight: Option<f64> = None;

    for (idx, step) in steps.iter().enumerate() {
        if last_exercise_id != Some(step.exercise_id.as_str()) {
            cues.push(cue(
                offset,
                CoachCueType::ExerciseStart,
                idx,
                format!("Starting {}. Get ready.", step.exercise_name),
            ));
            last_exercise_id = Some(step.exercise_id.as_str());
            last_weight = None;
        }

        cues.push(cue(
            offset + 1,
            CoachCueType::SetStart,
            idx,
            format!("Set {} of {}.", step.set_order, step.exercise_name),
        ));

        if let Some(weight) = step.target_weight_kg {
            if last_weight != Some(weight) {
                cues.push(cue(
                    offset + 2,
                    CoachCueType::WeightReminder,
                    idx,
                    format!("Load reminder: {} kilos.", format_kg(weight)),
                ));
                last_weight = Some(weight);
            }
        }

        if step.set_order == 1 {
            cues.push(cue(
                offset + 3,
                CoachCueType::Encouragement,
                idx,
                "Good form. Focus on technique.".to_string(),
            ));
        }

        let set_seconds = estimate_set_seconds(step.target_reps);
        let is_last = idx + 1 >= steps.len();
        let rest = step.rest_after_seconds;

        if !is_last && rest > 0 {
            let rest_start = offset + set_seconds;
            cues.push(cue(
                rest_start,
                CoachCueType::RestStart,
                idx,
                format!("Rest for {rest} seconds."),
            ));
            if rest > REST_WARNING_SECONDS {
                cues.push(cue(
                    rest_start + rest - REST_WARNING_SECONDS,
                    CoachCueType::Rest10Left,
                    idx,
                    "10 seconds until the next set.".to_string(),
                ));
            }
            cues.push(cue(
                rest_start + rest,
                CoachCueType::NextSet,
                idx,
                "Next set. Get ready.".to_string(),
            ));
            offset = rest_start + rest;
        } else {
            offset += set_seconds;
        }
    }

    cues.sort_by_key(|c| c.offset_sec);

    CoachTimeline {
        version: TIMELINE_VERSION,
        estimated_total_sec: offset,
        cues,
    }
}

/// Cue-spacing heuristic only; there is no rep counting.
fn estimate_set_seconds(target_reps: u32) -> u32 {
    let estimate = (f64::from(target_reps) * SECONDS_PER_REP).round() as u32;
    estimate.clamp(MIN_SET_SECONDS, MAX_SET_SECONDS)
}

fn cue(offset_sec: u32, cue_type: CoachCueType, step_index: usize, text: String) -> CoachTimelineCue {
    CoachTimelineCue {
        id: format!("{}_{}_{}", cue_type.as_str(), step_index, offset_sec),
        offset_sec,
        cue_type,
        step_index,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ExerciseSet, WorkoutExercise, WorkoutPlan};
    use crate::runner::flatten_workout_plan;
    use chrono::Utc;

    fn bench_plan() -> WorkoutPlan {
        WorkoutPlan::new("Push Day", Utc::now()).with_exercise(
            WorkoutExercise::new(1, "Bench Press")
                .with_id("bench")
                .with_set(ExerciseSet::new(1, 10, Some(60.0), 90).with_id("s1"))
                .with_set(ExerciseSet::new(2, 10, Some(60.0), 90).with_id("s2")),
        )
    }

    #[test]
    fn test_estimate_is_clamped() {
        assert_eq!(estimate_set_seconds(1), 25);
        assert_eq!(estimate_set_seconds(10), 35);
        assert_eq!(estimate_set_seconds(11), 39); // 38.5 rounds up
        assert_eq!(estimate_set_seconds(40), 75);
    }

    #[test]
    fn test_single_exercise_timeline() {
        let steps = flatten_workout_plan(&bench_plan());
        let timeline = build_coach_timeline(&steps);

        let summary: Vec<(u32, CoachCueType)> =
            timeline.cues.iter().map(|c| (c.offset_sec, c.cue_type)).collect();
        assert_eq!(
            summary,
            vec![
                (0, CoachCueType::ExerciseStart),
                (1, CoachCueType::SetStart),
                (2, CoachCueType::WeightReminder),
                (3, CoachCueType::Encouragement),
                (35, CoachCueType::RestStart),
                (115, CoachCueType::Rest10Left),
                (125, CoachCueType::NextSet),
                (126, CoachCueType::SetStart),
            ]
        );
        // Last step gets no rest cues.
        assert_eq!(timeline.estimated_total_sec, 125 + 35);
        assert_eq!(timeline.version, 1);
        assert_eq!(timeline.cues[4].id, "rest_start_0_35");
    }

    #[test]
    fn test_weight_reminder_repeats_only_on_change() {
        let plan = WorkoutPlan::new("Push", Utc::now()).with_exercise(
            WorkoutExercise::new(1, "Bench")
                .with_set(ExerciseSet::new(1, 10, Some(60.0), 0))
                .with_set(ExerciseSet::new(2, 10, Some(60.0), 0))
                .with_set(ExerciseSet::new(3, 10, Some(70.0), 0)),
        );
        let timeline = build_coach_timeline(&flatten_workout_plan(&plan));
        let reminders: Vec<usize> = timeline
            .cues
            .iter()
            .filter(|c| c.cue_type == CoachCueType::WeightReminder)
            .map(|c| c.step_index)
            .collect();
        assert_eq!(reminders, vec![0, 2]);
    }

    #[test]
    fn test_short_rest_has_no_warning() {
        let plan = WorkoutPlan::new("Calves", Utc::now()).with_exercise(
            WorkoutExercise::new(1, "Calf Raise")
                .with_set(ExerciseSet::new(1, 15, None, 10))
                .with_set(ExerciseSet::new(2, 15, None, 10)),
        );
        let timeline = build_coach_timeline(&flatten_workout_plan(&plan));
        assert!(timeline.cues.iter().all(|c| c.cue_type != CoachCueType::Rest10Left));
        assert!(timeline.cues.iter().all(|c| c.cue_type != CoachCueType::WeightReminder));
    }

    #[test]
    fn test_timeline_is_deterministic() {
        let steps = flatten_workout_plan(&bench_plan());
        let first = serde_json::to_string(&build_coach_timeline(&steps)).unwrap();
        let second = serde_json::to_string(&build_coach_timeline(&steps)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_steps_give_empty_timeline() {
        let timeline = build_coach_timeline(&[]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.estimated_total_sec, 0);
    }

    #[test]
    fn test_cue_type_serializes_with_wire_tags() {
        let json = serde_json::to_string(&CoachCueType::Rest10Left).unwrap();
        assert_eq!(json, "\"rest_10_left\"");
    }
}
