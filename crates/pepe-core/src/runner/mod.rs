//! Session runner: step flattening, coach timeline, the live state machine
//! and the coach text shown while it runs.

pub mod input;
pub mod machine;
pub mod step;
pub mod text;
pub mod timeline;

pub use machine::{RunnerEffect, RunnerSettings, SessionRunner};
pub use step::{RunnerStep, flatten_workout_plan};
pub use text::{coach_text, format_kg};
pub use timeline::{CoachCueType, CoachTimeline, CoachTimelineCue, build_coach_timeline};
