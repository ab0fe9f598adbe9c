//! Application layer for pepe.
//!
//! This crate coordinates the pure runner from `pepe-core` with the
//! asynchronous outside world: the 1-second clock, draft persistence,
//! speech, rest alerts and coach playback.

pub mod coach_player;
pub mod draft_bridge;
pub mod effects;
pub mod runner_usecase;
pub mod ticker;

pub use coach_player::{CoachPlayer, PlaybackSummary};
pub use draft_bridge::DraftPersistenceBridge;
pub use effects::EffectDispatcher;
pub use runner_usecase::{NudgeDirection, NudgeSize, RunnerSnapshot, WorkoutRunnerUseCase};
pub use ticker::{IntervalTickScheduler, TickScheduler};
