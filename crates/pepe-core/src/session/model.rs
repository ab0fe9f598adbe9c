//! Completed session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::SetType;

/// Snapshot of one completed set, taken when the set is logged.
///
/// Target values are copied from the runner step; actual values are parsed
/// from the user's input and stay `None` when left blank or unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetLog {
    pub exercise_id: String,
    pub exercise_name: String,
    pub set_id: String,
    pub set_order: u32,
    #[serde(default)]
    pub set_type: SetType,
    pub target_reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_rir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_tempo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl SessionSetLog {
    /// Reps used for volume: actual reps, or the target when not logged.
    pub fn effective_reps(&self) -> u32 {
        self.actual_reps.unwrap_or(self.target_reps)
    }

    /// Weight used for volume and PRs: actual weight, or the target.
    pub fn effective_weight_kg(&self) -> Option<f64> {
        self.actual_weight_kg.or(self.target_weight_kg)
    }
}

/// A finished workout, written once when the runner finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub workout_plan_id: String,
    pub workout_plan_label: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default)]
    pub set_logs: Vec<SessionSetLog>,
}

impl WorkoutSession {
    /// Builds a session record with its logs ordered by completion time,
    /// then by exercise name.
    pub fn assemble(
        id: impl Into<String>,
        workout_plan_id: impl Into<String>,
        workout_plan_label: impl Into<String>,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        mut set_logs: Vec<SessionSetLog>,
    ) -> Self {
        set_logs.sort_by(|a, b| {
            a.completed_at
                .cmp(&b.completed_at)
                .then_with(|| a.exercise_name.cmp(&b.exercise_name))
        });
        Self {
            id: id.into(),
            workout_plan_id: workout_plan_id.into(),
            workout_plan_label: workout_plan_label.into(),
            started_at,
            ended_at,
            set_logs,
        }
    }

    /// Session length in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.ended_at - self.started_at).num_seconds().max(0)
    }
}
