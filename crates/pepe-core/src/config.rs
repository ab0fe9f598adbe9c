use serde::{Deserialize, Serialize};

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub quick_adjust: QuickAdjustSettings,
    #[serde(default)]
    pub voice: VoiceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TimerSettings {
    /// Start the rest countdown as soon as a set is logged.
    pub auto_start_rest_after_set: bool,
    pub warn_10_seconds: bool,
    pub sounds_enabled: bool,
    pub haptics_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            auto_start_rest_after_set: true,
            warn_10_seconds: true,
            sounds_enabled: true,
            haptics_enabled: true,
        }
    }
}

/// Step sizes for the quick +/- buttons.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct QuickAdjustSettings {
    pub weight_step_small_kg: f64,
    pub weight_step_large_kg: f64,
    pub rep_step: u32,
}

impl Default for QuickAdjustSettings {
    fn default() -> Self {
        Self {
            weight_step_small_kg: 1.0,
            weight_step_large_kg: 2.5,
            rep_step: 1,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VoiceSettings {
    pub enabled: bool,
    pub locale: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            locale: "en-US".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [timer]
            auto_start_rest_after_set = false

            [voice]
            locale = "pt-BR"
            "#,
        )
        .unwrap();

        assert!(!config.timer.auto_start_rest_after_set);
        assert!(config.timer.warn_10_seconds);
        assert_eq!(config.voice.locale, "pt-BR");
        assert!(config.voice.enabled);
        assert_eq!(config.quick_adjust.weight_step_large_kg, 2.5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
