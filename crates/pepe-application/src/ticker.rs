//! Tick scheduling for the runner clock.
//!
//! The runner loop asks for one tick at a time and re-checks the session
//! state after each, instead of running a free-standing interval.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Source of clock ticks.
#[async_trait]
pub trait TickScheduler: Send + Sync {
    /// Waits for the next tick.
    ///
    /// # Returns
    ///
    /// `false` if `cancel` fired first; the caller must stop ticking.
    async fn next_tick(&self, cancel: &CancellationToken) -> bool;
}

/// Ticks every `period` using the tokio timer.
///
/// Under a paused tokio clock (`start_paused = true`) ticks follow virtual
/// time, so tests can drive a session without waiting.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTickScheduler {
    period: Duration,
}

impl IntervalTickScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for IntervalTickScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl TickScheduler for IntervalTickScheduler {
    async fn next_tick(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.period) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_tick_waits_one_period() {
        let scheduler = IntervalTickScheduler::default();
        let token = CancellationToken::new();
        let start = Instant::now();

        assert!(scheduler.next_tick(&token).await);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_stops_ticking() {
        let scheduler = IntervalTickScheduler::default();
        let token = CancellationToken::new();
        token.cancel();
        assert!(!scheduler.next_tick(&token).await);
    }
}
