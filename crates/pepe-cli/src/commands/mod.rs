pub mod history;
pub mod plans;
pub mod profile;
pub mod session;
pub mod timeline;

use anyhow::{Result, anyhow};
use pepe_core::plan::{PlanRepository, WorkoutPlan};

use crate::app::AppContext;

pub(crate) async fn find_plan(ctx: &AppContext, plan_id: &str) -> Result<WorkoutPlan> {
    ctx.store
        .find_by_id(plan_id)
        .await?
        .ok_or_else(|| anyhow!("No plan with id '{}'. Try `pepe plans list`.", plan_id))
}
