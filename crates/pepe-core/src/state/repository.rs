//! Injectable application-state store.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::state::model::{AppData, AppDataPatch};

/// Single source of truth for [`AppData`].
///
/// Constructed once at startup and handed to whoever needs it; there is no
/// global instance.
#[async_trait]
pub trait AppStore: Send + Sync {
    /// Returns a snapshot of the current data.
    async fn get(&self) -> AppData;

    /// Applies a partial update and persists the result.
    ///
    /// # Returns
    ///
    /// The data after the patch was applied.
    async fn set(&self, patch: AppDataPatch) -> Result<AppData>;

    /// Subscribes to changes. The receiver starts at the current value.
    fn subscribe(&self) -> watch::Receiver<AppData>;
}
