pub mod app_state_service;
pub mod config_service;
pub mod console_speech;
pub mod paths;
pub mod rest_alerts;
pub mod storage;

pub use crate::app_state_service::AppStateService;
pub use crate::config_service::ConfigService;
pub use crate::console_speech::{ConsoleSpeech, LineSink};
pub use crate::paths::PepePaths;
pub use crate::rest_alerts::TimerRestAlerts;
