//! Timer-backed rest alerts.
//!
//! Each schedule call spawns a task that sleeps until the warning and end
//! instants and writes a notification line. Cancelling a handle stops its
//! task before anything further is written.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use pepe_core::error::Result;
use pepe_core::notify::{RestAlertConfig, RestAlertHandle, RestAlertService, RestCueKind};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::console_speech::LineSink;

const WARNING_SECONDS: u32 = 10;
pub const WARNING_TEXT: &str = "Rest: 10 seconds until the next set.";
pub const END_TEXT: &str = "Rest finished. Time for the next set.";

/// Rest alerts delivered as timed lines on a sink.
pub struct TimerRestAlerts {
    sink: LineSink,
    pending: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl TimerRestAlerts {
    pub fn new(sink: LineSink) -> Self {
        Self {
            sink,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of alert sets still armed.
    #[cfg(test)]
    fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

#[async_trait]
impl RestAlertService for TimerRestAlerts {
    async fn schedule_rest_alerts(
        &self,
        seconds: u32,
        config: &RestAlertConfig,
    ) -> Result<RestAlertHandle> {
        let handle = RestAlertHandle(Uuid::new_v4().to_string());
        if seconds == 0 {
            return Ok(handle);
        }

        let token = CancellationToken::new();
        lock(&self.pending).insert(handle.0.clone(), token.clone());

        let warning_at = (config.warn_10_seconds && seconds > WARNING_SECONDS)
            .then(|| Duration::from_secs(u64::from(seconds - WARNING_SECONDS)));
        let end_at = Duration::from_secs(u64::from(seconds));
        let bell = if config.sounds_enabled { "\x07" } else { "" };

        let sink = self.sink.clone();
        let pending = self.pending.clone();
        let id = handle.0.clone();
        let start = tokio::time::Instant::now();

        tokio::spawn(async move {
            if let Some(warning_at) = warning_at {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep_until(start + warning_at) => sink(&format!("{WARNING_TEXT}{bell}")),
                }
            }
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(start + end_at) => sink(&format!("{END_TEXT}{bell}")),
            }
            lock(&pending).remove(&id);
        });

        tracing::debug!(target: "alerts", handle = %handle.0, seconds, "Rest alerts scheduled");
        Ok(handle)
    }

    async fn cancel_rest_alerts(&self, handle: &RestAlertHandle) -> Result<()> {
        if let Some(token) = lock(&self.pending).remove(handle.as_str()) {
            token.cancel();
            tracing::debug!(target: "alerts", handle = %handle.0, "Rest alerts cancelled");
        }
        Ok(())
    }

    async fn trigger_foreground_cue(&self, kind: RestCueKind, config: &RestAlertConfig) -> Result<()> {
        if !config.haptics_enabled {
            return Ok(());
        }
        let text = match kind {
            RestCueKind::TenSeconds => "[cue] 10 seconds",
            RestCueKind::End => "[cue] rest over",
        };
        (self.sink)(text);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (TimerRestAlerts, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let alerts = TimerRestAlerts::new(Arc::new(move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));
        (alerts, lines)
    }

    fn quiet() -> RestAlertConfig {
        RestAlertConfig {
            sounds_enabled: false,
            ..RestAlertConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_warning_and_end_fire_in_order() {
        let (alerts, lines) = recording();
        alerts.schedule_rest_alerts(30, &quiet()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(*lines.lock().unwrap(), vec![WARNING_TEXT.to_string()]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lines.lock().unwrap().len(), 2);
        assert_eq!(lines.lock().unwrap()[1], END_TEXT);
        assert_eq!(alerts.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_rest_skips_warning() {
        let (alerts, lines) = recording();
        alerts.schedule_rest_alerts(8, &quiet()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(*lines.lock().unwrap(), vec![END_TEXT.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_silences_pending_alerts() {
        let (alerts, lines) = recording();
        let handle = alerts.schedule_rest_alerts(30, &quiet()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        alerts.cancel_rest_alerts(&handle).await.unwrap();
        alerts.cancel_rest_alerts(&handle).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(lines.lock().unwrap().is_empty());
        assert_eq!(alerts.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_foreground_cue_respects_haptics() {
        let (alerts, lines) = recording();
        let off = RestAlertConfig {
            haptics_enabled: false,
            ..RestAlertConfig::default()
        };
        alerts.trigger_foreground_cue(RestCueKind::End, &off).await.unwrap();
        assert!(lines.lock().unwrap().is_empty());

        alerts
            .trigger_foreground_cue(RestCueKind::TenSeconds, &RestAlertConfig::default())
            .await
            .unwrap();
        assert_eq!(lines.lock().unwrap().len(), 1);
    }
}
