//! Demo plans for a fresh installation.

use chrono::{DateTime, Utc};

use super::model::{ExerciseSet, SetType, WorkoutExercise, WorkoutPlan};

/// Builds the two demo plans: an upper-body day with a superset and a
/// lower-body day with a drop-set chain.
pub fn demo_plans(now: DateTime<Utc>) -> Vec<WorkoutPlan> {
    vec![upper_plan(now), lower_plan(now)]
}

fn upper_plan(now: DateTime<Utc>) -> WorkoutPlan {
    let bench = WorkoutExercise::new(1, "Bench Press")
        .with_superset_group("upper-ss-1")
        .with_set(ExerciseSet::new(1, 12, Some(40.0), 60).with_set_type(SetType::Warmup))
        .with_set(ExerciseSet::new(2, 10, Some(60.0), 90).with_rpe(8.0))
        .with_set(ExerciseSet::new(3, 8, Some(65.0), 90).with_rpe(9.0));

    let row = WorkoutExercise::new(2, "Barbell Row")
        .with_superset_group("upper-ss-1")
        .with_set(ExerciseSet::new(1, 12, Some(40.0), 60).with_set_type(SetType::Warmup))
        .with_set(ExerciseSet::new(2, 10, Some(50.0), 90))
        .with_set(ExerciseSet::new(3, 10, Some(55.0), 90));

    let press = WorkoutExercise::new(3, "Dumbbell Shoulder Press")
        .with_set(ExerciseSet::new(1, 12, Some(18.0), 75).with_tempo("3-1-1"))
        .with_set(ExerciseSet::new(2, 10, Some(20.0), 75).with_rir(2.0));

    let mut plan = WorkoutPlan::new("Upper A", now)
        .with_exercise(bench)
        .with_exercise(row)
        .with_exercise(press);
    plan.notes = Some("Superset bench and rows, no rest between partners.".to_string());
    plan
}

fn lower_plan(now: DateTime<Utc>) -> WorkoutPlan {
    let squat = WorkoutExercise::new(1, "Back Squat")
        .with_set(ExerciseSet::new(1, 8, Some(80.0), 120))
        .with_set(ExerciseSet::new(2, 8, Some(80.0), 120))
        .with_set(ExerciseSet::new(3, 8, Some(80.0), 120));

    let leg_press = WorkoutExercise::new(2, "Leg Press")
        .with_set(ExerciseSet::new(1, 12, Some(140.0), 90))
        .with_set(
            ExerciseSet::new(2, 10, Some(160.0), 90)
                .with_drop_set_group("leg-press-drop")
                .with_set_type(SetType::Working),
        )
        .with_set(
            ExerciseSet::new(3, 10, Some(120.0), 90)
                .with_drop_set_group("leg-press-drop")
                .with_set_type(SetType::Drop),
        )
        .with_set(
            ExerciseSet::new(4, 12, Some(90.0), 90)
                .with_drop_set_group("leg-press-drop")
                .with_set_type(SetType::Failure)
                .with_notes("Go until form breaks"),
        );

    let calves = WorkoutExercise::new(3, "Standing Calf Raise")
        .with_set(ExerciseSet::new(1, 15, Some(40.0), 45))
        .with_set(ExerciseSet::new(2, 15, Some(40.0), 45));

    WorkoutPlan::new("Lower A", now)
        .with_exercise(squat)
        .with_exercise(leg_press)
        .with_exercise(calves)
}
