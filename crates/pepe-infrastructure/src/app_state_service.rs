//! Application state service implementation.
//!
//! `AppStateService` holds the single [`AppData`] document in a
//! `tokio::sync::watch` channel and writes it to `app_data.json` on every
//! change. It implements the app store plus the plan, session and draft
//! repositories on top of that one document.

use std::path::PathBuf;

use async_trait::async_trait;
use pepe_core::error::{PepeError, Result};
use pepe_core::plan::{PlanRepository, WorkoutPlan};
use pepe_core::session::{DraftRepository, SessionDraft, SessionRepository, WorkoutSession};
use pepe_core::state::{AppData, AppDataPatch, AppStore};
use tokio::sync::{Mutex, watch};

use crate::storage::AtomicFile;

/// Service for managing application state.
///
/// # Example
///
/// ```ignore
/// use pepe_infrastructure::app_state_service::AppStateService;
///
/// let service = AppStateService::open(paths.app_data_file());
/// let plans = service.list_all().await?;
/// ```
pub struct AppStateService {
    /// `None` keeps everything in memory.
    file: Option<AtomicFile<AppData>>,
    state: watch::Sender<AppData>,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl AppStateService {
    /// Opens the document at `path`.
    ///
    /// A missing file starts from defaults. An unreadable file also starts
    /// from defaults, with a warning; it is overwritten on the next change.
    pub fn open(path: PathBuf) -> Self {
        let file = AtomicFile::json(path);
        let data = match file.load() {
            Ok(data) => data.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    target: "storage",
                    "Failed to read {}: {}; starting with empty data",
                    file.path().display(),
                    e
                );
                AppData::default()
            }
        };
        Self::with_data(Some(file), data)
    }

    /// Creates a service that never touches the disk.
    pub fn in_memory(data: AppData) -> Self {
        Self::with_data(None, data)
    }

    fn with_data(file: Option<AtomicFile<AppData>>, data: AppData) -> Self {
        let (state, _) = watch::channel(data);
        Self {
            file,
            state,
            write_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> AppData {
        self.state.borrow().clone()
    }

    /// Applies `f` to the latest document, persists it, then publishes it.
    ///
    /// With a backing file the change runs as a locked read-modify-write on
    /// the file, so writes made by another process since this one opened it
    /// are merged rather than overwritten. Subscribers never observe a
    /// change that failed to persist.
    async fn mutate<F>(&self, f: F) -> Result<AppData>
    where
        F: FnOnce(&mut AppData) + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;

        let data = match &self.file {
            Some(file) => {
                let file = file.clone();
                let fallback = self.snapshot();
                tokio::task::spawn_blocking(move || file.update(fallback, f))
                    .await
                    .map_err(|e| PepeError::internal(format!("Storage task failed: {}", e)))??
            }
            None => {
                let mut data = self.snapshot();
                f(&mut data);
                data
            }
        };

        self.state.send_replace(data.clone());
        Ok(data)
    }
}

#[async_trait]
impl AppStore for AppStateService {
    async fn get(&self) -> AppData {
        self.snapshot()
    }

    async fn set(&self, patch: AppDataPatch) -> Result<AppData> {
        self.mutate(move |data| patch.apply(data)).await
    }

    fn subscribe(&self) -> watch::Receiver<AppData> {
        self.state.subscribe()
    }
}

#[async_trait]
impl PlanRepository for AppStateService {
    async fn find_by_id(&self, plan_id: &str) -> Result<Option<WorkoutPlan>> {
        Ok(self.state.borrow().find_plan(plan_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<WorkoutPlan>> {
        Ok(self.state.borrow().workout_plans.clone())
    }

    async fn save(&self, plan: &WorkoutPlan) -> Result<()> {
        let plan = plan.clone();
        self.mutate(move |data| data.upsert_plan(plan)).await?;
        Ok(())
    }

    async fn delete(&self, plan_id: &str) -> Result<()> {
        let plan_id = plan_id.to_string();
        self.mutate(move |data| {
            data.remove_plan(&plan_id);
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for AppStateService {
    async fn append_session(&self, session: &WorkoutSession) -> Result<()> {
        let stored = session.clone();
        self.mutate(move |data| data.prepend_session(stored)).await?;
        tracing::info!(target: "storage", "Stored session {}", session.id);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<WorkoutSession>> {
        Ok(self.state.borrow().sessions.clone())
    }
}

#[async_trait]
impl DraftRepository for AppStateService {
    async fn save_draft(&self, draft: &SessionDraft) -> Result<()> {
        let draft = draft.clone();
        self.mutate(move |data| data.session_draft = Some(draft)).await?;
        Ok(())
    }

    async fn load_draft(&self) -> Result<Option<SessionDraft>> {
        Ok(self.state.borrow().session_draft.clone())
    }

    async fn clear_draft(&self) -> Result<()> {
        self.mutate(|data| data.session_draft = None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pepe_core::plan::demo_plans;
    use pepe_core::state::Profile;
    use std::fs;
    use tempfile::TempDir;

    fn session(id: &str) -> WorkoutSession {
        let now = Utc::now();
        WorkoutSession::assemble(id, "p", "Push", now, now, Vec::new())
    }

    #[tokio::test]
    async fn test_plans_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app_data.json");

        let service = AppStateService::open(path.clone());
        for plan in demo_plans(Utc::now()) {
            service.save(&plan).await.unwrap();
        }

        let reopened = AppStateService::open(path);
        let labels: Vec<String> = reopened
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.day_label)
            .collect();
        assert_eq!(labels, vec!["Lower A", "Upper A"]);
    }

    #[tokio::test]
    async fn test_sessions_are_newest_first() {
        let service = AppStateService::in_memory(AppData::default());
        service.append_session(&session("first")).await.unwrap();
        service.append_session(&session("second")).await.unwrap();

        let ids: Vec<String> = service
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_draft_save_load_clear() {
        let service = AppStateService::in_memory(AppData::default());
        assert!(service.load_draft().await.unwrap().is_none());

        let draft = SessionDraft::new("d1", "p1", "Push", Utc::now());
        service.save_draft(&draft).await.unwrap();
        assert_eq!(service.load_draft().await.unwrap(), Some(draft));

        service.clear_draft().await.unwrap();
        service.clear_draft().await.unwrap();
        assert!(service.load_draft().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_patches() {
        let service = AppStateService::in_memory(AppData::default());
        let mut rx = service.subscribe();

        let profile = Profile {
            name: "Ana".to_string(),
            ..Profile::default()
        };
        service.set(AppDataPatch::profile(profile)).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().profile.name, "Ana");
        assert_eq!(service.get().await.profile.name, "Ana");
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app_data.json");
        fs::write(&path, "{ broken").unwrap();

        let service = AppStateService::open(path);
        assert_eq!(service.get().await, AppData::default());
    }

    #[tokio::test]
    async fn test_failed_write_is_not_published() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = temp_dir.path().join("app_data.json");
        fs::create_dir_all(path.join("blocker")).unwrap();

        let service = AppStateService::open(path);
        let result = service.append_session(&session("lost")).await;
        assert!(result.is_err());
        assert!(service.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_merge_with_changes_from_another_process() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app_data.json");

        // Both open the same empty document, as two `pepe` processes would.
        let runner = AppStateService::open(path.clone());
        let planner = AppStateService::open(path.clone());

        for plan in demo_plans(Utc::now()) {
            planner.save(&plan).await.unwrap();
        }
        let draft = SessionDraft::new("d1", "p1", "Push", Utc::now());
        runner.save_draft(&draft).await.unwrap();

        assert_eq!(runner.list_all().await.unwrap().len(), 2);

        let reopened = AppStateService::open(path);
        assert_eq!(reopened.list_all().await.unwrap().len(), 2);
        assert_eq!(reopened.load_draft().await.unwrap(), Some(draft));
    }

    #[tokio::test]
    async fn test_delete_unknown_plan_is_ok() {
        let service = AppStateService::in_memory(AppData::default());
        service.delete("nope").await.unwrap();
    }
}
