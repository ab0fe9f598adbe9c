//! Step flattening.
//!
//! Turns a plan into the linear list of sets the runner walks through.
//! Supersets are interleaved round by round and rests collapse to zero
//! between superset partners and inside drop-set chains.

use serde::{Deserialize, Serialize};

use crate::plan::{ExerciseSet, SetType, WorkoutExercise, WorkoutPlan};

/// One executable set of a session, with its exercise context denormalized.
///
/// Optional plan fields are normalized here (blank strings become `None`,
/// missing set types become [`SetType::Working`]) so the state machine never
/// has to default them again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerStep {
    pub index: usize,
    pub total: usize,
    pub exercise_id: String,
    pub exercise_name: String,
    pub exercise_notes: Option<String>,
    pub superset_group_id: Option<String>,
    pub set_id: String,
    pub set_order: u32,
    pub exercise_set_count: usize,
    pub set_type: SetType,
    pub drop_set_group_id: Option<String>,
    pub target_reps: u32,
    pub target_weight_kg: Option<f64>,
    /// Rest authored on the set.
    pub rest_seconds: u32,
    /// Rest actually taken after this step.
    pub rest_after_seconds: u32,
    pub target_rpe: Option<f64>,
    pub target_rir: Option<f64>,
    pub target_tempo: Option<String>,
    pub set_notes: Option<String>,
}

impl RunnerStep {
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }
}

/// Flattens a plan into ordered runner steps.
///
/// An empty plan yields an empty list; callers must refuse to start a
/// session in that case.
pub fn flatten_workout_plan(plan: &WorkoutPlan) -> Vec<RunnerStep> {
    let mut steps = ordered_steps(plan);

    for idx in 0..steps.len() {
        let rest = match steps.get(idx + 1) {
            Some(next) if continues_without_rest(&steps[idx], next) => 0,
            _ => steps[idx].rest_seconds,
        };
        steps[idx].rest_after_seconds = rest;
    }

    let total = steps.len();
    for (index, step) in steps.iter_mut().enumerate() {
        step.index = index;
        step.total = total;
    }
    steps
}

fn continues_without_rest(current: &RunnerStep, next: &RunnerStep) -> bool {
    let same_superset_round = current.superset_group_id.is_some()
        && next.superset_group_id == current.superset_group_id
        && next.set_order == current.set_order;

    let chained_drop = current.drop_set_group_id.is_some()
        && next.drop_set_group_id == current.drop_set_group_id
        && next.exercise_id == current.exercise_id;

    same_superset_round || chained_drop
}

fn ordered_steps(plan: &WorkoutPlan) -> Vec<RunnerStep> {
    let mut exercises: Vec<&WorkoutExercise> = plan.exercises.iter().collect();
    exercises.sort_by_key(|e| e.order);

    let mut out = Vec::new();
    let mut i = 0;
    while i < exercises.len() {
        let current = exercises[i];
        let Some(group) = current.superset_group() else {
            push_exercise(&mut out, current);
            i += 1;
            continue;
        };

        // Grouping is adjacency-based: only the contiguous run is merged.
        let mut j = i + 1;
        while j < exercises.len() && exercises[j].superset_group() == Some(group) {
            j += 1;
        }
        let block = &exercises[i..j];

        if block.len() == 1 {
            push_exercise(&mut out, current);
        } else {
            let rounds = block.iter().map(|e| e.sets.len()).max().unwrap_or(0);
            for round in 1..=rounds {
                for exercise in block {
                    if let Some(set) = exercise.sets.iter().find(|s| s.order as usize == round) {
                        out.push(step_from(exercise, set));
                    }
                }
            }
        }
        i = j;
    }
    out
}

fn push_exercise(out: &mut Vec<RunnerStep>, exercise: &WorkoutExercise) {
    let mut sets: Vec<&ExerciseSet> = exercise.sets.iter().collect();
    sets.sort_by_key(|s| s.order);
    out.extend(sets.into_iter().map(|set| step_from(exercise, set)));
}

fn step_from(exercise: &WorkoutExercise, set: &ExerciseSet) -> RunnerStep {
    RunnerStep {
        index: 0,
        total: 0,
        exercise_id: exercise.id.clone(),
        exercise_name: exercise.name.clone(),
        exercise_notes: non_blank(exercise.notes.as_deref()),
        superset_group_id: exercise.superset_group().map(str::to_string),
        set_id: set.id.clone(),
        set_order: set.order,
        exercise_set_count: exercise.sets.len(),
        set_type: set.set_type.unwrap_or_default(),
        drop_set_group_id: non_blank(set.drop_set_group_id.as_deref()),
        target_reps: set.target_reps.max(1),
        target_weight_kg: set.target_weight_kg.filter(|w| w.is_finite()).map(|w| w.max(0.0)),
        rest_seconds: set.rest_seconds,
        rest_after_seconds: set.rest_seconds,
        target_rpe: set.rpe.filter(|v| v.is_finite()),
        target_rir: set.rir.filter(|v| v.is_finite()),
        target_tempo: non_blank(set.tempo.as_deref()),
        set_notes: non_blank(set.notes.as_deref()),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ExerciseSet, WorkoutExercise, WorkoutPlan};
    use chrono::Utc;

    fn set(id: &str, order: u32, rest: u32) -> ExerciseSet {
        ExerciseSet::new(order, 10, Some(50.0), rest).with_id(id)
    }

    fn labels(steps: &[RunnerStep]) -> Vec<&str> {
        steps.iter().map(|s| s.set_id.as_str()).collect()
    }

    #[test]
    fn test_empty_plan_has_no_steps() {
        let plan = WorkoutPlan::new("Empty", Utc::now());
        assert!(flatten_workout_plan(&plan).is_empty());
    }

    #[test]
    fn test_plain_exercises_run_sequentially_sorted_by_order() {
        let plan = WorkoutPlan::new("Push", Utc::now())
            .with_exercise(WorkoutExercise::new(2, "Fly").with_set(set("f1", 1, 60)))
            .with_exercise(
                WorkoutExercise::new(1, "Bench")
                    .with_set(set("b2", 2, 90))
                    .with_set(set("b1", 1, 90)),
            );
        let steps = flatten_workout_plan(&plan);
        assert_eq!(labels(&steps), vec!["b1", "b2", "f1"]);
        assert_eq!(steps[0].index, 0);
        assert!(steps.iter().all(|s| s.total == 3));
        assert!(steps[2].is_last());
    }

    #[test]
    fn test_superset_interleaves_rounds() {
        let plan = WorkoutPlan::new("Push", Utc::now())
            .with_exercise(
                WorkoutExercise::new(1, "A")
                    .with_superset_group("X")
                    .with_set(set("a1", 1, 60))
                    .with_set(set("a2", 2, 60)),
            )
            .with_exercise(
                WorkoutExercise::new(2, "B")
                    .with_superset_group("X")
                    .with_set(set("b1", 1, 75))
                    .with_set(set("b2", 2, 75)),
            );
        let steps = flatten_workout_plan(&plan);
        assert_eq!(labels(&steps), vec!["a1", "b1", "a2", "b2"]);

        let rests: Vec<u32> = steps.iter().map(|s| s.rest_after_seconds).collect();
        assert_eq!(rests, vec![0, 75, 0, 75]);
    }

    #[test]
    fn test_uneven_superset_skips_missing_sets() {
        let plan = WorkoutPlan::new("Push", Utc::now())
            .with_exercise(
                WorkoutExercise::new(1, "A")
                    .with_superset_group("X")
                    .with_set(set("a1", 1, 60))
                    .with_set(set("a2", 2, 60))
                    .with_set(set("a3", 3, 60)),
            )
            .with_exercise(
                WorkoutExercise::new(2, "B")
                    .with_superset_group("X")
                    .with_set(set("b1", 1, 60)),
            );
        let steps = flatten_workout_plan(&plan);
        assert_eq!(labels(&steps), vec!["a1", "b1", "a2", "a3"]);
        // a2 -> a3 is a new round of the same group, so rest applies.
        assert_eq!(steps[2].rest_after_seconds, 60);
    }

    #[test]
    fn test_lone_grouped_exercise_is_sequential() {
        let plan = WorkoutPlan::new("Legs", Utc::now())
            .with_exercise(
                WorkoutExercise::new(1, "Squat")
                    .with_superset_group("solo")
                    .with_set(set("s1", 1, 120))
                    .with_set(set("s2", 2, 120)),
            )
            .with_exercise(WorkoutExercise::new(2, "Lunge").with_set(set("l1", 1, 60)));
        let steps = flatten_workout_plan(&plan);
        assert_eq!(labels(&steps), vec!["s1", "s2", "l1"]);
        // Same group but different set order: rest is kept.
        assert_eq!(steps[0].rest_after_seconds, 120);
    }

    #[test]
    fn test_non_adjacent_groups_are_not_merged() {
        let plan = WorkoutPlan::new("Mixed", Utc::now())
            .with_exercise(
                WorkoutExercise::new(1, "A")
                    .with_superset_group("X")
                    .with_set(set("a1", 1, 30))
                    .with_set(set("a2", 2, 30)),
            )
            .with_exercise(WorkoutExercise::new(2, "M").with_set(set("m1", 1, 30)))
            .with_exercise(
                WorkoutExercise::new(3, "B")
                    .with_superset_group("X")
                    .with_set(set("b1", 1, 30))
                    .with_set(set("b2", 2, 30)),
            );
        let steps = flatten_workout_plan(&plan);
        assert_eq!(labels(&steps), vec!["a1", "a2", "m1", "b1", "b2"]);
    }

    #[test]
    fn test_drop_set_chain_collapses_rest() {
        let plan = WorkoutPlan::new("Arms", Utc::now()).with_exercise(
            WorkoutExercise::new(1, "Curl")
                .with_set(set("c1", 1, 60))
                .with_set(set("c2", 2, 60).with_drop_set_group("d"))
                .with_set(set("c3", 3, 60).with_drop_set_group("d"))
                .with_set(set("c4", 4, 60)),
        );
        let steps = flatten_workout_plan(&plan);
        let rests: Vec<u32> = steps.iter().map(|s| s.rest_after_seconds).collect();
        assert_eq!(rests, vec![60, 0, 60, 60]);
        assert_eq!(steps[3].rest_seconds, 60);
    }

    #[test]
    fn test_step_normalizes_optional_fields() {
        let plan = WorkoutPlan::new("Push", Utc::now()).with_exercise(
            WorkoutExercise::new(1, "Bench")
                .with_notes("   ")
                .with_set(set("b1", 1, 60).with_tempo("").with_notes("Pause at chest")),
        );
        let step = &flatten_workout_plan(&plan)[0];
        assert_eq!(step.set_type, SetType::Working);
        assert!(step.exercise_notes.is_none());
        assert!(step.target_tempo.is_none());
        assert_eq!(step.set_notes.as_deref(), Some("Pause at chest"));
        assert_eq!(step.exercise_set_count, 1);
    }
}
