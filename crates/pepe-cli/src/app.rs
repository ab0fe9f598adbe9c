//! Composition root for the `pepe` binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use pepe_application::{EffectDispatcher, IntervalTickScheduler, WorkoutRunnerUseCase};
use pepe_core::config::AppConfig;
use pepe_core::notify::{RestAlertConfig, SpeechService};
use pepe_core::runner::RunnerSettings;
use pepe_infrastructure::{AppStateService, ConfigService, ConsoleSpeech, LineSink, PepePaths, TimerRestAlerts};

pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<AppStateService>,
}

impl AppContext {
    /// Resolves the data directory and loads the config file.
    ///
    /// Runs before logging is installed, so config problems surface as
    /// warnings only once the subscriber exists.
    pub fn config() -> Result<(PepePaths, AppConfig)> {
        let paths = PepePaths::resolve().context("Failed to resolve the pepe directory")?;
        let config = ConfigService::new(&paths).get_config();
        Ok((paths, config))
    }

    pub fn open(paths: &PepePaths, config: AppConfig) -> Self {
        tracing::debug!(target: "app", dir = %paths.base_dir().display(), "Opening app data");
        Self {
            config,
            store: Arc::new(AppStateService::open(paths.app_data_file())),
        }
    }

    /// Speech that prints coach lines to the terminal.
    pub fn speech(&self) -> Arc<dyn SpeechService> {
        Arc::new(ConsoleSpeech::new(console_sink()))
    }

    /// Wires a runner use case to the store and the console.
    pub fn runner(&self) -> WorkoutRunnerUseCase {
        let effects = Arc::new(EffectDispatcher::spawn(
            self.speech(),
            Arc::new(TimerRestAlerts::new(console_sink())),
            self.config.voice.locale.clone(),
            RestAlertConfig::from(&self.config.timer),
        ));

        WorkoutRunnerUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            effects,
            Arc::new(IntervalTickScheduler::default()),
            RunnerSettings::from(&self.config),
            self.config.quick_adjust.clone(),
        )
    }
}

/// Prints coach and alert lines, colored by their tag.
fn console_sink() -> LineSink {
    Arc::new(|line: &str| {
        if line.starts_with("[coach]") {
            println!("{}", line.bright_blue());
        } else {
            println!("{}", line.bright_yellow());
        }
    })
}
