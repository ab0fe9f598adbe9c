pub mod model;
pub mod repository;

pub use model::{AppData, AppDataPatch, ExperienceLevel, Profile, SedentaryLevel};
pub use repository::AppStore;
