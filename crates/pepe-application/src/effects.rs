//! Fire-and-forget dispatch of runner side effects.
//!
//! Speech and rest alerts each get a worker task fed through an unbounded
//! channel, so a transition never waits on either. Collaborator failures
//! are logged and dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use pepe_core::notify::{RestAlertConfig, RestAlertHandle, RestAlertService, RestCueKind, SpeechService};
use pepe_core::runner::RunnerEffect;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Identifies one armed set of rest alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AlertKey {
    session_id: String,
    step_index: usize,
    seconds: u32,
}

enum SpeechCommand {
    Speak { text: String, generation: u64 },
    Stop,
    Flush(oneshot::Sender<()>),
}

enum AlertCommand {
    Schedule(AlertKey),
    Cancel,
    Cue(RestCueKind),
    Flush(oneshot::Sender<()>),
}

/// Routes [`RunnerEffect`]s to the speech and rest-alert services.
pub struct EffectDispatcher {
    speech_tx: mpsc::UnboundedSender<SpeechCommand>,
    alert_tx: mpsc::UnboundedSender<AlertCommand>,
    /// Bumped by every stop; queued speech from older generations is dropped.
    speech_generation: Arc<AtomicU64>,
}

impl EffectDispatcher {
    /// Spawns the worker tasks. Must be called inside a tokio runtime.
    pub fn spawn(
        speech: Arc<dyn SpeechService>,
        alerts: Arc<dyn RestAlertService>,
        locale: impl Into<String>,
        alert_config: RestAlertConfig,
    ) -> Self {
        let (speech_tx, speech_rx) = mpsc::unbounded_channel();
        let (alert_tx, alert_rx) = mpsc::unbounded_channel();
        let speech_generation = Arc::new(AtomicU64::new(0));

        tokio::spawn(speech_worker(
            speech,
            locale.into(),
            speech_rx,
            speech_generation.clone(),
        ));
        tokio::spawn(alert_worker(alerts, alert_config, alert_rx));

        Self {
            speech_tx,
            alert_tx,
            speech_generation,
        }
    }

    /// Queues the effects of one transition. Never blocks.
    pub fn dispatch(&self, session_id: &str, effects: Vec<RunnerEffect>) {
        for effect in effects {
            let sent = match effect {
                RunnerEffect::Speak(text) => self
                    .speech_tx
                    .send(SpeechCommand::Speak {
                        text,
                        generation: self.speech_generation.load(Ordering::SeqCst),
                    })
                    .is_ok(),
                RunnerEffect::StopSpeaking => {
                    self.speech_generation.fetch_add(1, Ordering::SeqCst);
                    self.speech_tx.send(SpeechCommand::Stop).is_ok()
                }
                RunnerEffect::ScheduleRestAlerts { step_index, seconds } => self
                    .alert_tx
                    .send(AlertCommand::Schedule(AlertKey {
                        session_id: session_id.to_string(),
                        step_index,
                        seconds,
                    }))
                    .is_ok(),
                RunnerEffect::CancelRestAlerts => self.alert_tx.send(AlertCommand::Cancel).is_ok(),
                RunnerEffect::ForegroundCue(kind) => self.alert_tx.send(AlertCommand::Cue(kind)).is_ok(),
            };
            if !sent {
                tracing::warn!(target: "effects", "Effect worker is gone; effect dropped");
            }
        }
    }

    /// Waits until every effect queued so far has been handled.
    pub async fn flush(&self) {
        let (speech_done, speech_wait) = oneshot::channel();
        let (alerts_done, alerts_wait) = oneshot::channel();
        if self.speech_tx.send(SpeechCommand::Flush(speech_done)).is_ok() {
            let _ = speech_wait.await;
        }
        if self.alert_tx.send(AlertCommand::Flush(alerts_done)).is_ok() {
            let _ = alerts_wait.await;
        }
    }
}

async fn speech_worker(
    speech: Arc<dyn SpeechService>,
    locale: String,
    mut rx: mpsc::UnboundedReceiver<SpeechCommand>,
    generation: Arc<AtomicU64>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            SpeechCommand::Speak { text, generation: queued_at } => {
                if queued_at < generation.load(Ordering::SeqCst) {
                    tracing::debug!(target: "speech", "Dropping stale utterance");
                    continue;
                }
                if let Err(e) = speech.speak(&text, &locale).await {
                    tracing::warn!(target: "speech", "speak failed: {}", e);
                }
            }
            SpeechCommand::Stop => {
                if let Err(e) = speech.stop_speaking().await {
                    tracing::warn!(target: "speech", "stop_speaking failed: {}", e);
                }
            }
            SpeechCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Alerts currently armed, with the instant their end alert fires.
struct ArmedAlerts {
    key: AlertKey,
    handle: RestAlertHandle,
    ends_at: Instant,
}

async fn alert_worker(
    alerts: Arc<dyn RestAlertService>,
    config: RestAlertConfig,
    mut rx: mpsc::UnboundedReceiver<AlertCommand>,
) {
    let mut armed: Option<ArmedAlerts> = None;

    while let Some(command) = rx.recv().await {
        match command {
            AlertCommand::Schedule(key) => {
                let ends_at = Instant::now() + Duration::from_secs(u64::from(key.seconds));
                if let Some(current) = &armed {
                    if is_duplicate(current, &key, ends_at) {
                        tracing::debug!(target: "alerts", "Rest alerts already armed for step {}", key.step_index);
                        continue;
                    }
                }
                if let Some(previous) = armed.take() {
                    cancel(alerts.as_ref(), &previous.handle).await;
                }
                match alerts.schedule_rest_alerts(key.seconds, &config).await {
                    Ok(handle) => {
                        armed = Some(ArmedAlerts {
                            key,
                            handle,
                            ends_at,
                        });
                    }
                    Err(e) => tracing::warn!(target: "alerts", "Failed to schedule rest alerts: {}", e),
                }
            }
            AlertCommand::Cancel => {
                if let Some(previous) = armed.take() {
                    cancel(alerts.as_ref(), &previous.handle).await;
                }
            }
            AlertCommand::Cue(kind) => {
                if let Err(e) = alerts.trigger_foreground_cue(kind, &config).await {
                    tracing::warn!(target: "alerts", "Foreground cue failed: {}", e);
                }
            }
            AlertCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Same session, step and length, ending within the same second.
fn is_duplicate(current: &ArmedAlerts, key: &AlertKey, ends_at: Instant) -> bool {
    let drift = if ends_at > current.ends_at {
        ends_at - current.ends_at
    } else {
        current.ends_at - ends_at
    };
    current.key == *key && drift < Duration::from_secs(1)
}

async fn cancel(alerts: &dyn RestAlertService, handle: &RestAlertHandle) {
    if let Err(e) = alerts.cancel_rest_alerts(handle).await {
        tracing::warn!(target: "alerts", "Failed to cancel rest alerts: {}", e);
    }
}
