//! Workout plan domain module.
//!
//! Plans are authored by the plan editor and are read-only input to the
//! session runner.
//!
//! # Module Structure
//!
//! - `model`: Plan, exercise and set models (`WorkoutPlan`, `WorkoutExercise`, `ExerciseSet`)
//! - `repository`: Repository trait for plan persistence
//! - `seed`: Demo plans used to populate an empty installation

mod model;
mod repository;
mod seed;

pub use model::{ExerciseSet, SetType, WorkoutExercise, WorkoutPlan};
pub use repository::PlanRepository;
pub use seed::demo_plans;
