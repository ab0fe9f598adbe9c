//! Session and draft repository traits.
//!
//! Both are best-effort local storage. The runner never retries a failed
//! call beyond what an implementation does itself.

use async_trait::async_trait;

use super::draft::SessionDraft;
use super::model::WorkoutSession;
use crate::error::Result;

/// Storage for completed sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Appends a completed session. Sessions are immutable once stored.
    async fn append_session(&self, session: &WorkoutSession) -> Result<()>;

    /// Lists completed sessions, newest first.
    async fn list_sessions(&self) -> Result<Vec<WorkoutSession>>;
}

/// Storage for the single in-progress session draft.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Stores the draft, replacing any previous one (last write wins).
    async fn save_draft(&self, draft: &SessionDraft) -> Result<()>;

    /// Loads the stored draft, if any.
    async fn load_draft(&self) -> Result<Option<SessionDraft>>;

    /// Deletes the stored draft. Clearing an absent draft is not an error.
    async fn clear_draft(&self) -> Result<()>;
}
