//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` in the pepe directory.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pepe_core::config::AppConfig;
use pepe_core::error::Result;

use crate::paths::PepePaths;
use crate::storage::AtomicFile;

/// Configuration service that loads and caches the app configuration.
///
/// A missing file is created with defaults on first access; an unreadable
/// one is reported and replaced by defaults in memory only.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicFile<AppConfig>,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &PepePaths) -> Self {
        Self {
            file: AtomicFile::toml(paths.config_file()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> AppConfig {
        if let Some(cached) = read(&self.config).as_ref() {
            return cached.clone();
        }

        let loaded = self.load_or_create();
        *write(&self.config) = Some(loaded.clone());
        loaded
    }

    /// Writes the configuration and refreshes the cache.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        *write(&self.config) = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *write(&self.config) = None;
    }

    fn load_or_create(&self) -> AppConfig {
        match self.file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = AppConfig::default();
                if let Err(e) = self.file.save(&config) {
                    tracing::warn!(target: "config", "Failed to write default config: {}", e);
                }
                config
            }
            Err(e) => {
                tracing::warn!(
                    target: "config",
                    "Failed to read {}: {}; using defaults",
                    self.file.path().display(),
                    e
                );
                AppConfig::default()
            }
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
