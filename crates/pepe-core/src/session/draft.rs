//! Live session draft.
//!
//! The draft is the runner's whole mutable state. It is serialized after
//! every change so an interrupted session resumes where it left off.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::SessionSetLog;

/// State machine phases of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerPhase {
    /// Current step is loaded and waiting for the user to begin.
    SetReady,
    /// The set is being performed; the stopwatch ticks.
    SetActive,
    /// The set was logged and rest has not started.
    AfterSet,
    /// Resting; the countdown ticks.
    Rest,
    /// Every step has been processed.
    Done,
}

impl RunnerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            RunnerPhase::SetReady => "set_ready",
            RunnerPhase::SetActive => "set_active",
            RunnerPhase::AfterSet => "after_set",
            RunnerPhase::Rest => "rest",
            RunnerPhase::Done => "done",
        }
    }

    /// Returns `true` for phases driven by the 1-second clock.
    pub const fn is_ticking(self) -> bool {
        matches!(self, RunnerPhase::SetActive | RunnerPhase::Rest)
    }
}

impl fmt::Display for RunnerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable field of the set currently being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetInputField {
    Reps,
    WeightKg,
    Rpe,
    Rir,
    Tempo,
    Notes,
}

/// Free-text inputs for the current set, parsed only on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SetInputs {
    pub reps: String,
    pub weight_kg: String,
    pub rpe: String,
    pub rir: String,
    pub tempo: String,
    pub notes: String,
}

impl SetInputs {
    pub fn set(&mut self, field: SetInputField, value: impl Into<String>) {
        let slot = match field {
            SetInputField::Reps => &mut self.reps,
            SetInputField::WeightKg => &mut self.weight_kg,
            SetInputField::Rpe => &mut self.rpe,
            SetInputField::Rir => &mut self.rir,
            SetInputField::Tempo => &mut self.tempo,
            SetInputField::Notes => &mut self.notes,
        };
        *slot = value.into();
    }
}

/// Persisted live state of an in-progress session.
///
/// Owned by exactly one runner at a time. Clock-driven fields
/// (`rest_remaining`, `set_elapsed_seconds`) are stored as-is; wall-clock
/// time spent outside the app is not reconciled on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub id: String,
    pub plan_id: String,
    pub plan_label: String,
    pub started_at: DateTime<Utc>,
    /// Pointer into the flattened step list. Equals the step count only in `Done`.
    pub step_index: usize,
    pub phase: RunnerPhase,
    #[serde(default)]
    pub rest_remaining: u32,
    /// Whether the 10-second warning already fired for the current rest.
    #[serde(default)]
    pub rest_warning_fired: bool,
    #[serde(default)]
    pub inputs: SetInputs,
    #[serde(default)]
    pub set_elapsed_seconds: u32,
    #[serde(default)]
    pub set_logs: Vec<SessionSetLog>,
    #[serde(default)]
    pub voice_muted: bool,
    pub updated_at: DateTime<Utc>,
}

impl SessionDraft {
    /// Creates a fresh draft positioned on the first step.
    pub fn new(
        id: impl Into<String>,
        plan_id: impl Into<String>,
        plan_label: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            plan_id: plan_id.into(),
            plan_label: plan_label.into(),
            started_at: now,
            step_index: 0,
            phase: RunnerPhase::SetReady,
            rest_remaining: 0,
            rest_warning_fired: false,
            inputs: SetInputs::default(),
            set_elapsed_seconds: 0,
            set_logs: Vec::new(),
            voice_muted: false,
            updated_at: now,
        }
    }

    /// Inserts a log, replacing any existing entry for the same set.
    pub fn upsert_log(&mut self, log: SessionSetLog) {
        match self.set_logs.iter_mut().find(|l| l.set_id == log.set_id) {
            Some(existing) => *existing = log,
            None => self.set_logs.push(log),
        }
    }

    /// Repairs a draft restored against a (possibly edited) plan.
    ///
    /// Keeps `step_index` within `0..=total_steps` and keeps the
    /// `step_index == total_steps` <=> `Done` pairing intact.
    pub fn normalize(&mut self, total_steps: usize) {
        if self.step_index >= total_steps || self.phase == RunnerPhase::Done {
            self.step_index = total_steps;
            self.phase = RunnerPhase::Done;
        }
        if self.phase != RunnerPhase::Rest {
            self.rest_remaining = 0;
            self.rest_warning_fired = false;
        }
        if matches!(self.phase, RunnerPhase::SetReady | RunnerPhase::Done) {
            self.set_elapsed_seconds = 0;
        }
    }
}
