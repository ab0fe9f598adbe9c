//! Draft persistence bridge.
//!
//! Every runner change hands the full draft to [`DraftPersistenceBridge`],
//! which writes it from a background task. Submissions are coalesced
//! through a `watch` channel and debounced: the writer waits
//! [`DRAFT_DEBOUNCE`] after the first change, then stores only the newest
//! pending draft (last write wins). A flush cuts the wait short.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use pepe_core::session::{DraftRepository, SessionDraft};
use tokio::sync::{Notify, watch};

/// Quiet period before a burst of changes is written.
pub const DRAFT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
enum DraftCommand {
    Save(Box<SessionDraft>),
    Clear,
}

/// Best-effort background writer for the session draft.
pub struct DraftPersistenceBridge {
    pending: watch::Sender<Option<(u64, DraftCommand)>>,
    persisted: watch::Receiver<u64>,
    flush_now: Arc<Notify>,
    version: AtomicU64,
}

impl DraftPersistenceBridge {
    /// Spawns the writer task. Must be called inside a tokio runtime.
    pub fn spawn(repository: Arc<dyn DraftRepository>) -> Self {
        let (pending, pending_rx) = watch::channel(None);
        let (persisted_tx, persisted) = watch::channel(0);
        let flush_now = Arc::new(Notify::new());
        tokio::spawn(writer(repository, pending_rx, persisted_tx, flush_now.clone()));

        Self {
            pending,
            persisted,
            flush_now,
            version: AtomicU64::new(0),
        }
    }

    /// Queues `draft` to be stored, replacing any queued write.
    pub fn submit(&self, draft: &SessionDraft) {
        self.enqueue(DraftCommand::Save(Box::new(draft.clone())));
    }

    /// Queues deletion of the stored draft and waits for it.
    pub async fn clear(&self) {
        self.enqueue(DraftCommand::Clear);
        self.flush().await;
    }

    /// Waits until everything submitted so far has been handled.
    pub async fn flush(&self) {
        let target = self.version.load(Ordering::SeqCst);
        let mut persisted = self.persisted.clone();
        if *persisted.borrow() >= target {
            return;
        }
        self.flush_now.notify_one();
        if persisted.wait_for(|done| *done >= target).await.is_err() {
            tracing::warn!(target: "draft", "Draft writer stopped before flushing");
        }
    }

    fn enqueue(&self, command: DraftCommand) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.send_replace(Some((version, command)));
    }
}

async fn writer(
    repository: Arc<dyn DraftRepository>,
    mut pending: watch::Receiver<Option<(u64, DraftCommand)>>,
    persisted: watch::Sender<u64>,
    flush_now: Arc<Notify>,
) {
    while pending.changed().await.is_ok() {
        tokio::select! {
            _ = tokio::time::sleep(DRAFT_DEBOUNCE) => {}
            _ = flush_now.notified() => {}
        }
        let Some((version, command)) = pending.borrow_and_update().clone() else {
            continue;
        };

        let result = match &command {
            DraftCommand::Save(draft) => repository.save_draft(draft).await,
            DraftCommand::Clear => repository.clear_draft().await,
        };
        match result {
            Ok(()) => tracing::debug!(target: "draft", version, "Draft persisted"),
            // Swallowed: the next change writes the full draft again.
            Err(e) => tracing::warn!(target: "draft", "Failed to persist draft: {}", e),
        }
        persisted.send_replace(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pepe_core::error::{PepeError, Result};
    use pepe_core::session::RunnerPhase;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockDraftRepository {
        stored: Mutex<Option<SessionDraft>>,
        writes: Mutex<usize>,
        fail: bool,
    }

    #[async_trait]
    impl DraftRepository for MockDraftRepository {
        async fn save_draft(&self, draft: &SessionDraft) -> Result<()> {
            if self.fail {
                return Err(PepeError::io("disk full"));
            }
            *self.writes.lock().unwrap() += 1;
            *self.stored.lock().unwrap() = Some(draft.clone());
            Ok(())
        }

        async fn load_draft(&self) -> Result<Option<SessionDraft>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn clear_draft(&self) -> Result<()> {
            *self.stored.lock().unwrap() = None;
            Ok(())
        }
    }

    fn draft(step_index: usize) -> SessionDraft {
        let mut draft = SessionDraft::new("d1", "p1", "Push", Utc::now());
        draft.step_index = step_index;
        draft
    }

    #[tokio::test]
    async fn test_burst_is_coalesced_to_last_write() {
        let repo = Arc::new(MockDraftRepository::default());
        let bridge = DraftPersistenceBridge::spawn(repo.clone());

        for step in 0..5 {
            bridge.submit(&draft(step));
        }
        bridge.flush().await;

        let stored = repo.stored.lock().unwrap().clone().unwrap();
        assert_eq!(stored.step_index, 4);
        assert_eq!(*repo.writes.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_within_debounce_window_share_one_write() {
        let repo = Arc::new(MockDraftRepository::default());
        let bridge = DraftPersistenceBridge::spawn(repo.clone());

        bridge.submit(&draft(0));
        tokio::time::sleep(DRAFT_DEBOUNCE / 2).await;
        assert_eq!(*repo.writes.lock().unwrap(), 0);

        bridge.submit(&draft(1));
        tokio::time::sleep(DRAFT_DEBOUNCE * 2).await;

        assert_eq!(*repo.writes.lock().unwrap(), 1);
        let stored = repo.stored.lock().unwrap().clone().unwrap();
        assert_eq!(stored.step_index, 1);

        bridge.submit(&draft(2));
        tokio::time::sleep(DRAFT_DEBOUNCE * 2).await;
        assert_eq!(*repo.writes.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear_wins_over_pending_save() {
        let repo = Arc::new(MockDraftRepository::default());
        let bridge = DraftPersistenceBridge::spawn(repo.clone());

        bridge.submit(&draft(1));
        bridge.flush().await;
        let mut resting = draft(2);
        resting.phase = RunnerPhase::Rest;
        bridge.submit(&resting);
        bridge.clear().await;

        assert!(repo.load_draft().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_does_not_block_flush() {
        let repo = Arc::new(MockDraftRepository {
            fail: true,
            ..MockDraftRepository::default()
        });
        let bridge = DraftPersistenceBridge::spawn(repo.clone());
        bridge.submit(&draft(0));
        bridge.flush().await;
        assert!(repo.stored.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flush_without_submissions_returns() {
        let bridge = DraftPersistenceBridge::spawn(Arc::new(MockDraftRepository::default()));
        bridge.flush().await;
    }
}
