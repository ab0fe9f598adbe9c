//! Workout plan domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a set within an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    Warmup,
    #[default]
    Working,
    Drop,
    Failure,
}

impl SetType {
    /// Human-readable label used in coach text.
    pub fn label(self) -> &'static str {
        match self {
            SetType::Warmup => "warm-up",
            SetType::Working => "working",
            SetType::Drop => "drop",
            SetType::Failure => "to failure",
        }
    }
}

/// A single target set of an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: String,
    /// 1-based position within the exercise.
    pub order: u32,
    pub target_reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    /// Rest after this set, before any superset/drop-set collapsing.
    #[serde(default)]
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_type: Option<SetType>,
    /// Sets sharing this ID within one exercise form a drop-set chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_set_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExerciseSet {
    /// Creates a working set with a fresh ID.
    pub fn new(order: u32, target_reps: u32, target_weight_kg: Option<f64>, rest_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order,
            target_reps: target_reps.max(1),
            target_weight_kg: target_weight_kg.map(|w| w.max(0.0)),
            rest_seconds,
            set_type: None,
            drop_set_group_id: None,
            rpe: None,
            rir: None,
            tempo: None,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_set_type(mut self, set_type: SetType) -> Self {
        self.set_type = Some(set_type);
        self
    }

    pub fn with_drop_set_group(mut self, group_id: impl Into<String>) -> Self {
        self.drop_set_group_id = Some(group_id.into());
        self
    }

    pub fn with_rpe(mut self, rpe: f64) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn with_rir(mut self, rir: f64) -> Self {
        self.rir = Some(rir);
        self
    }

    pub fn with_tempo(mut self, tempo: impl Into<String>) -> Self {
        self.tempo = Some(tempo.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// An exercise within a plan and its ordered sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: String,
    pub order: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Adjacent exercises sharing a non-empty group ID run interleaved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_group_id: Option<String>,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

impl WorkoutExercise {
    /// Creates an exercise with a fresh ID and no sets.
    pub fn new(order: u32, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order,
            name: name.into(),
            notes: None,
            superset_group_id: None,
            sets: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_superset_group(mut self, group_id: impl Into<String>) -> Self {
        self.superset_group_id = Some(group_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_set(mut self, set: ExerciseSet) -> Self {
        self.sets.push(set);
        self
    }

    /// Returns the superset group ID, treating a blank string as "no group".
    pub fn superset_group(&self) -> Option<&str> {
        self.superset_group_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A named training day made of ordered exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub day_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutPlan {
    /// Creates an empty plan with a fresh ID.
    pub fn new(day_label: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day_label: day_label.into(),
            notes: None,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_exercise(mut self, exercise: WorkoutExercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    /// Total number of sets across all exercises.
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_superset_group_is_none() {
        let exercise = WorkoutExercise::new(1, "Squat").with_superset_group("  ");
        assert!(exercise.superset_group().is_none());

        let grouped = WorkoutExercise::new(1, "Squat").with_superset_group("A");
        assert_eq!(grouped.superset_group(), Some("A"));
    }

    #[test]
    fn test_set_clamps_targets() {
        let set = ExerciseSet::new(1, 0, Some(-5.0), 60);
        assert_eq!(set.target_reps, 1);
        assert_eq!(set.target_weight_kg, Some(0.0));
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let plan = WorkoutPlan::new("Push", Utc::now())
            .with_id("p1")
            .with_exercise(
                WorkoutExercise::new(1, "Bench")
                    .with_set(ExerciseSet::new(1, 10, Some(60.0), 90).with_set_type(SetType::Warmup)),
            );
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["dayLabel"], "Push");
        assert_eq!(json["exercises"][0]["sets"][0]["targetReps"], 10);
        assert_eq!(json["exercises"][0]["sets"][0]["setType"], "warmup");
        assert!(json["exercises"][0].get("supersetGroupId").is_none());
        assert_eq!(plan.set_count(), 1);
    }
}
