//! Session domain module.
//!
//! This module contains the durable session record, the live draft that a
//! running session mutates, and the repository interfaces that persist both.
//!
//! # Module Structure
//!
//! - `model`: Completed session records (`WorkoutSession`, `SessionSetLog`)
//! - `draft`: Live runner state (`SessionDraft`, `RunnerPhase`, `SetInputs`)
//! - `repository`: Repository traits for sessions and drafts

mod draft;
mod model;
mod repository;

pub use draft::{RunnerPhase, SessionDraft, SetInputField, SetInputs};
pub use model::{SessionSetLog, WorkoutSession};
pub use repository::{DraftRepository, SessionRepository};
