pub mod analytics;
pub mod config;
pub mod error;
pub mod notify;
pub mod plan;
pub mod runner;
pub mod session;
pub mod state;

// Re-export common error type
pub use error::{PepeError, Result};
