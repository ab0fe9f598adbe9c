//! Application data aggregate.
//!
//! Everything the app persists lives in one [`AppData`] document.

use serde::{Deserialize, Serialize};

use crate::plan::WorkoutPlan;
use crate::session::{SessionDraft, WorkoutSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SedentaryLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// The user's training profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub experience_level: ExperienceLevel,
    pub sedentary_level: SedentaryLevel,
    pub goals: String,
}

/// Persisted application state.
///
/// Missing fields deserialize to their defaults, so documents written by
/// older versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    pub profile: Profile,
    /// Kept sorted by day label.
    pub workout_plans: Vec<WorkoutPlan>,
    /// Newest first.
    pub sessions: Vec<WorkoutSession>,
    pub session_draft: Option<SessionDraft>,
}

impl AppData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_plan(&self, plan_id: &str) -> Option<&WorkoutPlan> {
        self.workout_plans.iter().find(|p| p.id == plan_id)
    }

    /// Inserts or replaces a plan, keeping the list ordered by day label.
    pub fn upsert_plan(&mut self, plan: WorkoutPlan) {
        match self.workout_plans.iter_mut().find(|p| p.id == plan.id) {
            Some(existing) => *existing = plan,
            None => self.workout_plans.push(plan),
        }
        self.workout_plans
            .sort_by(|a, b| a.day_label.to_lowercase().cmp(&b.day_label.to_lowercase()));
    }

    /// Removes a plan. Returns `false` if it did not exist.
    pub fn remove_plan(&mut self, plan_id: &str) -> bool {
        let before = self.workout_plans.len();
        self.workout_plans.retain(|p| p.id != plan_id);
        self.workout_plans.len() != before
    }

    pub fn prepend_session(&mut self, session: WorkoutSession) {
        self.sessions.insert(0, session);
    }
}

/// Partial update applied by [`crate::state::AppStore::set`].
///
/// `None` leaves a field untouched. `session_draft` is doubly optional so a
/// patch can clear the draft (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct AppDataPatch {
    pub profile: Option<Profile>,
    pub workout_plans: Option<Vec<WorkoutPlan>>,
    pub sessions: Option<Vec<WorkoutSession>>,
    pub session_draft: Option<Option<SessionDraft>>,
}

impl AppDataPatch {
    pub fn profile(profile: Profile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }

    pub fn draft(draft: Option<SessionDraft>) -> Self {
        Self {
            session_draft: Some(draft),
            ..Self::default()
        }
    }

    pub fn apply(self, data: &mut AppData) {
        if let Some(profile) = self.profile {
            data.profile = profile;
        }
        if let Some(plans) = self.workout_plans {
            data.workout_plans = plans;
        }
        if let Some(sessions) = self.sessions {
            data.sessions = sessions;
        }
        if let Some(draft) = self.session_draft {
            data.session_draft = draft;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_empty_document_loads_defaults() {
        let data: AppData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, AppData::default());
        assert_eq!(data.profile.experience_level, ExperienceLevel::Beginner);
        assert_eq!(data.profile.sedentary_level, SedentaryLevel::Medium);
    }

    #[test]
    fn test_upsert_plan_keeps_label_order() {
        let now = Utc::now();
        let mut data = AppData::new();
        data.upsert_plan(WorkoutPlan::new("Upper B", now).with_id("b"));
        data.upsert_plan(WorkoutPlan::new("lower A", now).with_id("l"));
        data.upsert_plan(WorkoutPlan::new("Upper A", now).with_id("a"));
        data.upsert_plan(WorkoutPlan::new("Upper B v2", now).with_id("b"));

        let labels: Vec<_> = data.workout_plans.iter().map(|p| p.day_label.as_str()).collect();
        assert_eq!(labels, vec!["lower A", "Upper A", "Upper B v2"]);
        assert!(data.remove_plan("a"));
        assert!(!data.remove_plan("a"));
    }

    #[test]
    fn test_patch_can_clear_draft() {
        let mut data = AppData::new();
        data.session_draft = Some(SessionDraft::new("d", "p", "Push", Utc::now()));
        AppDataPatch::default().apply(&mut data);
        assert!(data.session_draft.is_some());

        AppDataPatch::draft(None).apply(&mut data);
        assert!(data.session_draft.is_none());
    }
}
