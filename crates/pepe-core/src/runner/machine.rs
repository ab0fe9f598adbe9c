//! Session runner state machine.
//!
//! `SessionRunner` owns the flattened steps and the live [`SessionDraft`].
//! Transitions are synchronous and take the current instant explicitly;
//! side effects are returned as [`RunnerEffect`]s for the caller to
//! dispatch without awaiting them.

use chrono::{DateTime, Utc};

use super::input::{self, parse_decimal, parse_positive_int, parse_text};
use super::step::{RunnerStep, flatten_workout_plan};
use super::text::{coach_text, format_decimal, format_kg};
use crate::config::AppConfig;
use crate::error::{PepeError, Result};
use crate::notify::RestCueKind;
use crate::plan::WorkoutPlan;
use crate::session::{RunnerPhase, SessionDraft, SessionSetLog, SetInputField, SetInputs, WorkoutSession};

const REST_WARNING_SECONDS: u32 = 10;
const REST_WARNING_TEXT: &str = "10 seconds left.";

/// Runner behavior toggles, read from the settings at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub auto_start_rest_after_set: bool,
    pub warn_10_seconds: bool,
    pub voice_enabled: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            auto_start_rest_after_set: true,
            warn_10_seconds: true,
            voice_enabled: true,
        }
    }
}

impl From<&AppConfig> for RunnerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            auto_start_rest_after_set: config.timer.auto_start_rest_after_set,
            warn_10_seconds: config.timer.warn_10_seconds,
            voice_enabled: config.voice.enabled,
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerEffect {
    Speak(String),
    StopSpeaking,
    /// Arm external rest alerts, replacing any armed ones.
    ScheduleRestAlerts { step_index: usize, seconds: u32 },
    CancelRestAlerts,
    ForegroundCue(RestCueKind),
}

/// Live driver of one workout session.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    steps: Vec<RunnerStep>,
    draft: SessionDraft,
    settings: RunnerSettings,
}

impl SessionRunner {
    /// Starts a new session on the first step of `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`PepeError::Precondition`] when the plan has no sets.
    pub fn start(
        plan: &WorkoutPlan,
        session_id: impl Into<String>,
        settings: RunnerSettings,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<RunnerEffect>)> {
        let steps = flatten_workout_plan(plan);
        if steps.is_empty() {
            return Err(PepeError::precondition(format!(
                "plan '{}' has no sets",
                plan.day_label
            )));
        }

        let mut runner = Self {
            steps,
            draft: SessionDraft::new(session_id, &plan.id, &plan.day_label, now),
            settings,
        };
        runner.load_inputs();

        let mut effects = Vec::new();
        runner.speak(&mut effects, runner.coach_text());
        Ok((runner, effects))
    }

    /// Rebuilds a runner from a stored draft.
    ///
    /// Steps are regenerated from `plan`; the draft's position and timers are
    /// kept as saved, only clamped if the plan has since shrunk.
    ///
    /// # Errors
    ///
    /// Returns [`PepeError::StaleDraft`] when `plan` is not the draft's plan.
    pub fn resume(
        plan: &WorkoutPlan,
        mut draft: SessionDraft,
        settings: RunnerSettings,
    ) -> Result<(Self, Vec<RunnerEffect>)> {
        if plan.id != draft.plan_id {
            return Err(PepeError::StaleDraft {
                plan_id: draft.plan_id,
            });
        }
        let steps = flatten_workout_plan(plan);
        draft.normalize(steps.len());

        let runner = Self {
            steps,
            draft,
            settings,
        };

        let mut effects = Vec::new();
        if runner.draft.phase == RunnerPhase::Rest && runner.draft.rest_remaining > 0 {
            effects.push(RunnerEffect::ScheduleRestAlerts {
                step_index: runner.draft.step_index,
                seconds: runner.draft.rest_remaining,
            });
        }
        runner.speak(&mut effects, runner.coach_text());
        Ok((runner, effects))
    }

    pub fn draft(&self) -> &SessionDraft {
        &self.draft
    }

    pub fn into_draft(self) -> SessionDraft {
        self.draft
    }

    pub fn steps(&self) -> &[RunnerStep] {
        &self.steps
    }

    pub fn settings(&self) -> RunnerSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: RunnerSettings) {
        self.settings = settings;
    }

    pub fn phase(&self) -> RunnerPhase {
        self.draft.phase
    }

    /// The step at `step_index`; `None` once done.
    pub fn current_step(&self) -> Option<&RunnerStep> {
        self.steps.get(self.draft.step_index)
    }

    pub fn next_step(&self) -> Option<&RunnerStep> {
        self.steps.get(self.draft.step_index + 1)
    }

    pub fn coach_text(&self) -> String {
        coach_text(
            self.current_step(),
            self.next_step(),
            self.draft.phase,
            self.draft.rest_remaining,
        )
    }

    /// `set_ready` -> `set_active`.
    pub fn start_set(&mut self, now: DateTime<Utc>) -> Result<Vec<RunnerEffect>> {
        self.require(&[RunnerPhase::SetReady], "start a set")?;
        self.draft.phase = RunnerPhase::SetActive;
        self.draft.set_elapsed_seconds = 0;
        self.touch(now);
        Ok(Vec::new())
    }

    /// Replaces one free-text input of the current set.
    pub fn set_input(
        &mut self,
        field: SetInputField,
        value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.require_editable("edit the set")?;
        self.draft.inputs.set(field, value);
        self.touch(now);
        Ok(())
    }

    /// Quick-adjusts the weight input by `delta_kg`.
    pub fn nudge_weight(&mut self, delta_kg: f64, now: DateTime<Utc>) -> Result<()> {
        self.require_editable("adjust the weight")?;
        self.draft.inputs.weight_kg = input::nudge_weight(&self.draft.inputs.weight_kg, delta_kg);
        self.touch(now);
        Ok(())
    }

    /// Quick-adjusts the reps input by `delta`.
    pub fn nudge_reps(&mut self, delta: i32, now: DateTime<Utc>) -> Result<()> {
        self.require_editable("adjust the reps")?;
        self.draft.inputs.reps = input::nudge_reps(&self.draft.inputs.reps, delta);
        self.touch(now);
        Ok(())
    }

    /// Logs the current set from the inputs and moves on.
    ///
    /// Completing the same set again replaces its log.
    pub fn complete_set(&mut self, now: DateTime<Utc>) -> Result<Vec<RunnerEffect>> {
        self.require_editable("complete a set")?;
        let Some(step) = self.current_step().cloned() else {
            return Err(PepeError::internal("no step at the current index"));
        };

        let log = build_log(&step, &self.draft.inputs, now);
        self.draft.upsert_log(log);

        let mut effects = Vec::new();
        if step.is_last() {
            self.advance(now, &mut effects);
        } else if step.rest_after_seconds > 0 && self.settings.auto_start_rest_after_set {
            self.enter_rest(step.rest_after_seconds, now, &mut effects);
        } else {
            self.draft.phase = RunnerPhase::AfterSet;
            self.touch(now);
        }
        Ok(effects)
    }

    /// `after_set` -> `rest`, or straight to the next step when the
    /// resolved rest is zero.
    pub fn start_rest(&mut self, now: DateTime<Utc>) -> Result<Vec<RunnerEffect>> {
        self.require(&[RunnerPhase::AfterSet], "start rest")?;
        let rest = self.current_step().map_or(0, |s| s.rest_after_seconds);

        let mut effects = Vec::new();
        if rest == 0 {
            self.advance(now, &mut effects);
        } else {
            self.enter_rest(rest, now, &mut effects);
        }
        Ok(effects)
    }

    /// Shifts the rest countdown by `delta_seconds`, clamped at zero.
    pub fn adjust_rest(&mut self, delta_seconds: i32, now: DateTime<Utc>) -> Result<Vec<RunnerEffect>> {
        self.require(&[RunnerPhase::Rest], "adjust rest")?;
        let remaining = (i64::from(self.draft.rest_remaining) + i64::from(delta_seconds)).max(0);
        let remaining = u32::try_from(remaining).unwrap_or(u32::MAX);

        self.draft.rest_remaining = remaining;
        if remaining > REST_WARNING_SECONDS {
            self.draft.rest_warning_fired = false;
        }
        self.touch(now);

        let mut effects = vec![if remaining > 0 {
            RunnerEffect::ScheduleRestAlerts {
                step_index: self.draft.step_index,
                seconds: remaining,
            }
        } else {
            RunnerEffect::CancelRestAlerts
        }];
        // Landing exactly on the mark would otherwise skip it, since the
        // next tick already reads 9.
        self.warn_if_due(&mut effects);
        Ok(effects)
    }

    /// Ends the rest early, exactly as if the countdown had reached zero.
    pub fn skip_rest(&mut self, now: DateTime<Utc>) -> Result<Vec<RunnerEffect>> {
        self.require(&[RunnerPhase::Rest], "skip rest")?;
        let mut effects = Vec::new();
        self.advance(now, &mut effects);
        Ok(effects)
    }

    /// Moves to the next step without resting.
    pub fn next_exercise(&mut self, now: DateTime<Utc>) -> Result<Vec<RunnerEffect>> {
        self.require(
            &[RunnerPhase::SetReady, RunnerPhase::AfterSet],
            "move to the next exercise",
        )?;
        let mut effects = Vec::new();
        self.advance(now, &mut effects);
        Ok(effects)
    }

    /// One second of the clock.
    ///
    /// Outside the ticking phases this is a no-op, so a late tick racing a
    /// transition is harmless.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<RunnerEffect> {
        let mut effects = Vec::new();
        match self.draft.phase {
            RunnerPhase::SetActive => {
                self.draft.set_elapsed_seconds = self.draft.set_elapsed_seconds.saturating_add(1);
                self.touch(now);
            }
            RunnerPhase::Rest => {
                self.draft.rest_remaining = self.draft.rest_remaining.saturating_sub(1);
                self.touch(now);

                self.warn_if_due(&mut effects);
                if self.draft.rest_remaining == 0 {
                    effects.push(RunnerEffect::ForegroundCue(RestCueKind::End));
                    self.advance(now, &mut effects);
                }
            }
            _ => {}
        }
        effects
    }

    /// Mutes or unmutes voice coaching for this session.
    pub fn set_voice_muted(&mut self, muted: bool, now: DateTime<Utc>) -> Vec<RunnerEffect> {
        self.draft.voice_muted = muted;
        self.touch(now);
        if muted {
            vec![RunnerEffect::StopSpeaking]
        } else {
            Vec::new()
        }
    }

    /// Assembles the completed session. Legal in any phase.
    ///
    /// The runner itself is left untouched; the caller drops it once the
    /// session is stored.
    pub fn finish(&self, now: DateTime<Utc>) -> (WorkoutSession, Vec<RunnerEffect>) {
        let session = WorkoutSession::assemble(
            &self.draft.id,
            &self.draft.plan_id,
            &self.draft.plan_label,
            self.draft.started_at,
            now,
            self.draft.set_logs.clone(),
        );
        (session, Self::shutdown_effects())
    }

    /// Effects that silence the session when it ends or is left.
    pub fn shutdown_effects() -> Vec<RunnerEffect> {
        vec![RunnerEffect::StopSpeaking, RunnerEffect::CancelRestAlerts]
    }

    fn warn_if_due(&mut self, effects: &mut Vec<RunnerEffect>) {
        if self.draft.rest_remaining == REST_WARNING_SECONDS
            && !self.draft.rest_warning_fired
            && self.settings.warn_10_seconds
        {
            self.draft.rest_warning_fired = true;
            effects.push(RunnerEffect::ForegroundCue(RestCueKind::TenSeconds));
            self.speak(effects, REST_WARNING_TEXT.to_string());
        }
    }

    fn enter_rest(&mut self, seconds: u32, now: DateTime<Utc>, effects: &mut Vec<RunnerEffect>) {
        self.draft.phase = RunnerPhase::Rest;
        self.draft.rest_remaining = seconds;
        self.draft.rest_warning_fired = false;
        self.touch(now);

        effects.push(RunnerEffect::ScheduleRestAlerts {
            step_index: self.draft.step_index,
            seconds,
        });
        self.speak(effects, self.coach_text());
    }

    fn advance(&mut self, now: DateTime<Utc>, effects: &mut Vec<RunnerEffect>) {
        if self.draft.phase == RunnerPhase::Rest {
            effects.push(RunnerEffect::CancelRestAlerts);
        }

        let total = self.steps.len();
        self.draft.step_index = (self.draft.step_index + 1).min(total);
        self.draft.phase = if self.draft.step_index >= total {
            RunnerPhase::Done
        } else {
            RunnerPhase::SetReady
        };
        self.draft.rest_remaining = 0;
        self.draft.rest_warning_fired = false;
        self.draft.set_elapsed_seconds = 0;
        self.load_inputs();
        self.touch(now);

        self.speak(effects, self.coach_text());
    }

    /// Fills the inputs from the current step's targets.
    fn load_inputs(&mut self) {
        self.draft.inputs = match self.current_step() {
            Some(step) => SetInputs {
                reps: step.target_reps.to_string(),
                weight_kg: step.target_weight_kg.map(format_kg).unwrap_or_default(),
                rpe: step.target_rpe.map(format_decimal).unwrap_or_default(),
                rir: step.target_rir.map(format_decimal).unwrap_or_default(),
                tempo: step.target_tempo.clone().unwrap_or_default(),
                notes: String::new(),
            },
            None => SetInputs::default(),
        };
    }

    fn speak(&self, effects: &mut Vec<RunnerEffect>, text: String) {
        if self.settings.voice_enabled && !self.draft.voice_muted {
            effects.push(RunnerEffect::Speak(text));
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.draft.updated_at = now;
    }

    fn require(&self, allowed: &[RunnerPhase], action: &str) -> Result<()> {
        if allowed.contains(&self.draft.phase) {
            Ok(())
        } else {
            Err(PepeError::invalid_transition(self.draft.phase.as_str(), action))
        }
    }

    fn require_editable(&self, action: &str) -> Result<()> {
        self.require(
            &[RunnerPhase::SetReady, RunnerPhase::SetActive, RunnerPhase::AfterSet],
            action,
        )
    }
}

fn build_log(step: &RunnerStep, inputs: &SetInputs, now: DateTime<Utc>) -> SessionSetLog {
    SessionSetLog {
        exercise_id: step.exercise_id.clone(),
        exercise_name: step.exercise_name.clone(),
        set_id: step.set_id.clone(),
        set_order: step.set_order,
        set_type: step.set_type,
        target_reps: step.target_reps,
        target_weight_kg: step.target_weight_kg,
        actual_reps: Some(parse_positive_int(&inputs.reps, step.target_reps)),
        actual_weight_kg: parse_decimal(&inputs.weight_kg).map(|w| w.max(0.0)),
        actual_rpe: parse_decimal(&inputs.rpe),
        actual_rir: parse_decimal(&inputs.rir),
        actual_tempo: parse_text(&inputs.tempo),
        notes: parse_text(&inputs.notes),
        completed_at: now,
    }
}
