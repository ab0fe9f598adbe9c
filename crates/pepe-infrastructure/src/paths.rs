//! Path management for pepe's files.
//!
//! ```text
//! $PEPE_HOME or ~/.config/pepe/
//! ├── config.toml      # AppConfig
//! └── app_data.json    # AppData (profile, plans, sessions, draft)
//! ```

use std::path::{Path, PathBuf};

use pepe_core::error::PepeError;

/// Environment variable overriding the base directory.
pub const PEPE_HOME_ENV: &str = "PEPE_HOME";

const APP_DIR: &str = "pepe";
const CONFIG_FILE: &str = "config.toml";
const APP_DATA_FILE: &str = "app_data.json";

/// Resolved locations of pepe's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PepePaths {
    base_dir: PathBuf,
}

impl PepePaths {
    /// Uses an explicit base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolves the base directory from `$PEPE_HOME`, falling back to the
    /// platform config directory.
    pub fn resolve() -> Result<Self, PepeError> {
        Self::resolve_from(std::env::var_os(PEPE_HOME_ENV).map(PathBuf::from))
    }

    fn resolve_from(home_override: Option<PathBuf>) -> Result<Self, PepeError> {
        if let Some(home) = home_override.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Self::new(home));
        }
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| PepeError::config("Cannot find the user config directory"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    pub fn app_data_file(&self) -> PathBuf {
        self.base_dir.join(APP_DATA_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let paths = PepePaths::resolve_from(Some(PathBuf::from("/tmp/pepe-test"))).unwrap();
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/pepe-test/config.toml"));
        assert_eq!(paths.app_data_file(), PathBuf::from("/tmp/pepe-test/app_data.json"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        if let Ok(paths) = PepePaths::resolve_from(Some(PathBuf::new())) {
            assert!(paths.base_dir().ends_with("pepe"));
        }
    }
}
