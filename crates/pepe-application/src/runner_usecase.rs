//! Workout runner use case.
//!
//! `WorkoutRunnerUseCase` owns the single live [`SessionRunner`] and wires
//! it to the outside world: the tick loop, draft persistence, speech and
//! rest alerts, and the session history.
//!
//! # Thread Safety
//!
//! The active run sits behind one `tokio::sync::Mutex`. Every transition
//! and every tick takes that lock, so the runner sees a single writer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pepe_core::config::QuickAdjustSettings;
use pepe_core::error::{PepeError, Result};
use pepe_core::plan::PlanRepository;
use pepe_core::runner::{RunnerEffect, RunnerSettings, RunnerStep, SessionRunner};
use pepe_core::session::{
    DraftRepository, RunnerPhase, SessionDraft, SessionRepository, SetInputField, SetInputs, WorkoutSession,
};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::draft_bridge::DraftPersistenceBridge;
use crate::effects::EffectDispatcher;
use crate::ticker::TickScheduler;

/// Quick-adjust step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeSize {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Up,
    Down,
}

impl NudgeDirection {
    fn sign(self) -> i32 {
        match self {
            NudgeDirection::Up => 1,
            NudgeDirection::Down => -1,
        }
    }
}

/// Read-only view of the live session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSnapshot {
    pub session_id: String,
    pub plan_label: String,
    pub phase: RunnerPhase,
    pub step_index: usize,
    pub total_steps: usize,
    pub current_step: Option<RunnerStep>,
    pub coach_text: String,
    pub rest_remaining: u32,
    pub set_elapsed_seconds: u32,
    pub inputs: SetInputs,
    pub logged_sets: usize,
    pub voice_muted: bool,
}

impl From<&SessionRunner> for RunnerSnapshot {
    fn from(runner: &SessionRunner) -> Self {
        let draft = runner.draft();
        Self {
            session_id: draft.id.clone(),
            plan_label: draft.plan_label.clone(),
            phase: draft.phase,
            step_index: draft.step_index,
            total_steps: runner.steps().len(),
            current_step: runner.current_step().cloned(),
            coach_text: runner.coach_text(),
            rest_remaining: draft.rest_remaining,
            set_elapsed_seconds: draft.set_elapsed_seconds,
            inputs: draft.inputs.clone(),
            logged_sets: draft.set_logs.len(),
            voice_muted: draft.voice_muted,
        }
    }
}

struct ActiveRun {
    runner: SessionRunner,
    ticker: Option<CancellationToken>,
}

/// State shared between the use case and its tick loop.
struct Shared {
    active: Mutex<Option<ActiveRun>>,
    effects: Arc<EffectDispatcher>,
    bridge: Arc<DraftPersistenceBridge>,
    ticks: Arc<dyn TickScheduler>,
    updates: watch::Sender<Option<RunnerSnapshot>>,
}

impl Shared {
    /// Propagates one change of `run`: effects, draft, ticker and snapshot.
    fn settle(self: &Arc<Self>, run: &mut ActiveRun, previous_phase: RunnerPhase, effects: Vec<RunnerEffect>) {
        let session_id = run.runner.draft().id.clone();
        self.effects.dispatch(&session_id, effects);
        self.bridge.submit(run.runner.draft());

        let phase = run.runner.phase();
        if phase != previous_phase {
            tracing::debug!(target: "runner", from = %previous_phase, to = %phase, "Phase changed");
            if let Some(ticker) = run.ticker.take() {
                ticker.cancel();
            }
        }
        if phase.is_ticking() && run.ticker.is_none() {
            run.ticker = Some(self.spawn_ticker());
        }

        self.updates.send_replace(Some(RunnerSnapshot::from(&run.runner)));
    }

    /// Starts a tick loop for the current ticking phase.
    ///
    /// The loop re-reads the phase after every tick and stops itself once
    /// the phase no longer ticks.
    fn spawn_ticker(self: &Arc<Self>) -> CancellationToken {
        let token = CancellationToken::new();
        let shared = Arc::clone(self);
        let cancel = token.clone();

        tokio::spawn(async move {
            while shared.ticks.next_tick(&cancel).await {
                let mut guard = shared.active.lock().await;
                if cancel.is_cancelled() {
                    break;
                }
                let Some(run) = guard.as_mut() else {
                    break;
                };

                let previous_phase = run.runner.phase();
                let effects = run.runner.tick(Utc::now());
                shared.settle(run, previous_phase, effects);
                if cancel.is_cancelled() {
                    break;
                }
            }
        });
        token
    }

    fn stop(&self, run: &mut ActiveRun) {
        if let Some(ticker) = run.ticker.take() {
            ticker.cancel();
        }
        let session_id = run.runner.draft().id.clone();
        self.effects.dispatch(&session_id, SessionRunner::shutdown_effects());
    }
}

/// Use case driving one live workout session at a time.
pub struct WorkoutRunnerUseCase {
    plans: Arc<dyn PlanRepository>,
    sessions: Arc<dyn SessionRepository>,
    drafts: Arc<dyn DraftRepository>,
    settings: RunnerSettings,
    quick_adjust: QuickAdjustSettings,
    shared: Arc<Shared>,
}

impl WorkoutRunnerUseCase {
    /// Creates the use case and spawns its draft writer.
    ///
    /// # Arguments
    ///
    /// * `plans` - Plan source used to start and resume sessions
    /// * `sessions` - History that receives finished sessions
    /// * `drafts` - Storage for the in-progress draft
    /// * `effects` - Dispatcher for speech and rest alerts
    /// * `ticks` - Clock driving `set_active` and `rest`
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        sessions: Arc<dyn SessionRepository>,
        drafts: Arc<dyn DraftRepository>,
        effects: Arc<EffectDispatcher>,
        ticks: Arc<dyn TickScheduler>,
        settings: RunnerSettings,
        quick_adjust: QuickAdjustSettings,
    ) -> Self {
        let (updates, _) = watch::channel(None);
        let bridge = Arc::new(DraftPersistenceBridge::spawn(drafts.clone()));
        Self {
            plans,
            sessions,
            drafts,
            settings,
            quick_adjust,
            shared: Arc::new(Shared {
                active: Mutex::new(None),
                effects,
                bridge,
                ticks,
                updates,
            }),
        }
    }

    /// Subscribes to snapshots published after every change.
    ///
    /// The value is `None` when no session is loaded.
    pub fn subscribe(&self) -> watch::Receiver<Option<RunnerSnapshot>> {
        self.shared.updates.subscribe()
    }

    pub async fn snapshot(&self) -> Option<RunnerSnapshot> {
        let guard = self.shared.active.lock().await;
        guard.as_ref().map(|run| RunnerSnapshot::from(&run.runner))
    }

    pub async fn has_active_session(&self) -> bool {
        self.shared.active.lock().await.is_some()
    }

    /// Starts a new session for `plan_id`, replacing any stored draft.
    ///
    /// # Errors
    ///
    /// - [`PepeError::SessionAlreadyActive`] if a session is running
    /// - [`PepeError::NotFound`] if the plan does not exist
    /// - [`PepeError::Precondition`] if the plan has no sets
    pub async fn start(&self, plan_id: &str) -> Result<RunnerSnapshot> {
        let mut guard = self.shared.active.lock().await;
        if guard.is_some() {
            return Err(PepeError::SessionAlreadyActive);
        }

        let plan = self
            .plans
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| PepeError::not_found("workout_plan", plan_id))?;

        let (runner, effects) =
            SessionRunner::start(&plan, Uuid::new_v4().to_string(), self.settings, Utc::now())?;
        tracing::info!(
            target: "runner",
            session_id = %runner.draft().id,
            plan = %plan.day_label,
            steps = runner.steps().len(),
            "Session started"
        );

        Ok(self.install(&mut guard, runner, effects))
    }

    /// Resumes the stored draft.
    ///
    /// # Errors
    ///
    /// - [`PepeError::NoDraft`] if nothing is stored
    /// - [`PepeError::StaleDraft`] if the draft's plan was deleted; the draft
    ///   is left in place so the caller can offer [`Self::discard`]
    pub async fn resume(&self) -> Result<RunnerSnapshot> {
        let mut guard = self.shared.active.lock().await;
        if guard.is_some() {
            return Err(PepeError::SessionAlreadyActive);
        }

        let draft = self.drafts.load_draft().await?.ok_or(PepeError::NoDraft)?;
        let Some(plan) = self.plans.find_by_id(&draft.plan_id).await? else {
            tracing::warn!(target: "runner", plan_id = %draft.plan_id, "Draft references a missing plan");
            return Err(PepeError::StaleDraft {
                plan_id: draft.plan_id,
            });
        };

        let (runner, effects) = SessionRunner::resume(&plan, draft, self.settings)?;
        tracing::info!(
            target: "runner",
            session_id = %runner.draft().id,
            phase = %runner.phase(),
            step = runner.draft().step_index,
            "Session resumed"
        );

        Ok(self.install(&mut guard, runner, effects))
    }

    /// Returns the stored draft without resuming it.
    pub async fn stored_draft(&self) -> Result<Option<SessionDraft>> {
        self.drafts.load_draft().await
    }

    pub async fn start_set(&self) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| runner.start_set(now)).await
    }

    pub async fn complete_set(&self) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| runner.complete_set(now)).await
    }

    pub async fn start_rest(&self) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| runner.start_rest(now)).await
    }

    pub async fn adjust_rest(&self, delta_seconds: i32) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| runner.adjust_rest(delta_seconds, now)).await
    }

    pub async fn skip_rest(&self) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| runner.skip_rest(now)).await
    }

    pub async fn next_exercise(&self) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| runner.next_exercise(now)).await
    }

    pub async fn set_input(&self, field: SetInputField, value: impl Into<String>) -> Result<RunnerSnapshot> {
        let value = value.into();
        self.apply(|runner, now| runner.set_input(field, value, now).map(|()| Vec::new()))
            .await
    }

    /// Nudges the weight input by the configured small or large step.
    pub async fn nudge_weight(&self, size: NudgeSize, direction: NudgeDirection) -> Result<RunnerSnapshot> {
        let step = match size {
            NudgeSize::Small => self.quick_adjust.weight_step_small_kg,
            NudgeSize::Large => self.quick_adjust.weight_step_large_kg,
        };
        let delta = step * f64::from(direction.sign());
        self.apply(|runner, now| runner.nudge_weight(delta, now).map(|()| Vec::new()))
            .await
    }

    /// Nudges the reps input by the configured rep step.
    pub async fn nudge_reps(&self, direction: NudgeDirection) -> Result<RunnerSnapshot> {
        let step = i32::try_from(self.quick_adjust.rep_step).unwrap_or(i32::MAX);
        let delta = step.saturating_mul(direction.sign());
        self.apply(|runner, now| runner.nudge_reps(delta, now).map(|()| Vec::new()))
            .await
    }

    pub async fn set_voice_muted(&self, muted: bool) -> Result<RunnerSnapshot> {
        self.apply(|runner, now| Ok(runner.set_voice_muted(muted, now)))
            .await
    }

    /// Finishes the session and stores it in the history.
    ///
    /// The draft is cleared only after the session was stored; if storing
    /// fails the session stays active and nothing is lost.
    pub async fn finish(&self) -> Result<WorkoutSession> {
        let mut guard = self.shared.active.lock().await;
        let run = guard.as_mut().ok_or(PepeError::NoActiveSession)?;

        let (session, _) = run.runner.finish(Utc::now());
        self.sessions.append_session(&session).await?;

        self.shared.stop(run);
        *guard = None;
        self.shared.bridge.clear().await;
        self.shared.updates.send_replace(None);

        tracing::info!(
            target: "runner",
            session_id = %session.id,
            sets = session.set_logs.len(),
            duration_secs = session.duration_seconds(),
            "Session finished"
        );
        Ok(session)
    }

    /// Abandons the active session, if any, and deletes the stored draft.
    ///
    /// Also the recovery path for a stale draft.
    pub async fn discard(&self) -> Result<()> {
        let mut guard = self.shared.active.lock().await;
        if let Some(mut run) = guard.take() {
            self.shared.stop(&mut run);
            tracing::info!(target: "runner", session_id = %run.runner.draft().id, "Session discarded");
        }
        self.shared.bridge.clear().await;
        self.shared.updates.send_replace(None);
        Ok(())
    }

    /// Leaves the session without ending it.
    ///
    /// Stops the clock, speech and alerts, writes the latest draft and
    /// releases the runner. The draft stays resumable.
    pub async fn suspend(&self) -> Result<()> {
        let mut guard = self.shared.active.lock().await;
        let Some(mut run) = guard.take() else {
            return Ok(());
        };
        self.shared.stop(&mut run);
        self.shared.bridge.submit(run.runner.draft());
        self.shared.bridge.flush().await;
        self.shared.updates.send_replace(None);

        tracing::info!(target: "runner", session_id = %run.runner.draft().id, "Session suspended");
        Ok(())
    }

    /// Waits until queued draft writes and effects have been handled.
    pub async fn flush(&self) {
        self.shared.bridge.flush().await;
        self.shared.effects.flush().await;
    }

    fn install(
        &self,
        slot: &mut Option<ActiveRun>,
        runner: SessionRunner,
        effects: Vec<RunnerEffect>,
    ) -> RunnerSnapshot {
        let previous_phase = runner.phase();
        let run = slot.insert(ActiveRun {
            runner,
            ticker: None,
        });
        self.shared.settle(run, previous_phase, effects);
        RunnerSnapshot::from(&run.runner)
    }

    async fn apply<F>(&self, op: F) -> Result<RunnerSnapshot>
    where
        F: FnOnce(&mut SessionRunner, DateTime<Utc>) -> Result<Vec<RunnerEffect>>,
    {
        let mut guard = self.shared.active.lock().await;
        let run = guard.as_mut().ok_or(PepeError::NoActiveSession)?;

        let previous_phase = run.runner.phase();
        let effects = op(&mut run.runner, Utc::now())?;
        self.shared.settle(run, previous_phase, effects);
        Ok(RunnerSnapshot::from(&run.runner))
    }
}
