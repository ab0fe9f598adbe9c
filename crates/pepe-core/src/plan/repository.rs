//! Plan repository trait.

use async_trait::async_trait;

use super::model::WorkoutPlan;
use crate::error::Result;

/// An abstract repository for workout plans.
///
/// The session runner only needs [`PlanRepository::find_by_id`]; the other
/// operations back the plan editor and the CLI.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Finds a plan by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(WorkoutPlan))`: Plan found
    /// - `Ok(None)`: Plan not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, plan_id: &str) -> Result<Option<WorkoutPlan>>;

    /// Lists all plans, sorted by day label.
    async fn list_all(&self) -> Result<Vec<WorkoutPlan>>;

    /// Inserts or replaces a plan (matched by ID).
    async fn save(&self, plan: &WorkoutPlan) -> Result<()>;

    /// Deletes a plan. Deleting an unknown ID is not an error.
    async fn delete(&self, plan_id: &str) -> Result<()>;
}
