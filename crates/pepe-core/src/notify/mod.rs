//! Speech and rest-alert collaborators.
//!
//! Both are best-effort: callers log failures and carry on, and a muted or
//! missing implementation never changes what the runner does.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TimerSettings;
use crate::error::Result;

/// Foreground cue played while the app is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestCueKind {
    /// Ten seconds of rest left.
    TenSeconds,
    /// Rest is over.
    End,
}

/// Options forwarded with each alert request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestAlertConfig {
    pub warn_10_seconds: bool,
    pub sounds_enabled: bool,
    pub haptics_enabled: bool,
}

impl Default for RestAlertConfig {
    fn default() -> Self {
        Self::from(&TimerSettings::default())
    }
}

impl From<&TimerSettings> for RestAlertConfig {
    fn from(timer: &TimerSettings) -> Self {
        Self {
            warn_10_seconds: timer.warn_10_seconds,
            sounds_enabled: timer.sounds_enabled,
            haptics_enabled: timer.haptics_enabled,
        }
    }
}

/// Identifies the alerts armed by one `schedule_rest_alerts` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestAlertHandle(pub String);

impl RestAlertHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Text-to-speech output.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn speak(&self, text: &str, locale: &str) -> Result<()>;

    /// Interrupts whatever is being spoken.
    async fn stop_speaking(&self) -> Result<()>;
}

/// Out-of-app rest notifications plus foreground cues.
#[async_trait]
pub trait RestAlertService: Send + Sync {
    /// Arms the end-of-rest alert, and the 10-second warning when enabled
    /// and `seconds` is above 10.
    async fn schedule_rest_alerts(
        &self,
        seconds: u32,
        config: &RestAlertConfig,
    ) -> Result<RestAlertHandle>;

    async fn cancel_rest_alerts(&self, handle: &RestAlertHandle) -> Result<()>;

    /// Plays a cue right now. No-op when haptics are disabled.
    async fn trigger_foreground_cue(&self, kind: RestCueKind, config: &RestAlertConfig) -> Result<()>;
}
