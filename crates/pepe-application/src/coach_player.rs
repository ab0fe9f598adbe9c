//! Timed playback of a coach timeline.

use std::sync::Arc;
use std::time::Duration;

use pepe_core::notify::SpeechService;
use pepe_core::runner::CoachTimeline;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of one playback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub spoken: usize,
    /// `false` when playback was cancelled before the last cue.
    pub completed: bool,
}

/// Speaks each cue of a [`CoachTimeline`] at its offset from the moment
/// playback starts.
pub struct CoachPlayer {
    speech: Arc<dyn SpeechService>,
    locale: String,
}

impl CoachPlayer {
    pub fn new(speech: Arc<dyn SpeechService>, locale: impl Into<String>) -> Self {
        Self {
            speech,
            locale: locale.into(),
        }
    }

    /// Plays `timeline` until the last cue or until `cancel` fires.
    ///
    /// Cues sharing an offset are spoken back to back in timeline order.
    /// A failed utterance is logged and playback continues.
    pub async fn play(&self, timeline: &CoachTimeline, cancel: CancellationToken) -> PlaybackSummary {
        let started = Instant::now();
        let mut spoken = 0;

        for cue in &timeline.cues {
            let due = started + Duration::from_secs(u64::from(cue.offset_sec));
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Err(e) = self.speech.stop_speaking().await {
                        tracing::warn!(target: "coach", "Failed to stop speech: {}", e);
                    }
                    tracing::debug!(target: "coach", spoken, "Playback cancelled");
                    return PlaybackSummary {
                        spoken,
                        completed: false,
                    };
                }
                _ = tokio::time::sleep_until(due) => {}
            }

            tracing::trace!(target: "coach", cue = %cue.id, offset = cue.offset_sec, kind = cue.cue_type.as_str(), "Cue");
            if let Err(e) = self.speech.speak(&cue.text, &self.locale).await {
                tracing::warn!(target: "coach", "Failed to speak cue {}: {}", cue.id, e);
            }
            spoken += 1;
        }

        PlaybackSummary {
            spoken,
            completed: true,
        }
    }
}
