use crate::core::frame_processor::FrameProcessorConfig;
use crate::core::rep_counter::{RepPolicy, DEFAULT_DEBOUNCE_MS};
use crate::core::rep_state::RepThresholds;
use crate::core::rep_tracker::MIN_EVENT_BUFFER;
use crate::models::exercise::{BodySide, ExerciseMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest accepted debounce window
pub const MAX_DEBOUNCE_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Exercise selected when a session starts
    pub default_mode: ExerciseMode,
    /// Which side of the body to measure
    pub body_side: BodySide,
    /// Flexed / extended angle thresholds in degrees
    pub thresholds: RepThresholds,
    /// Minimum time between two counted reps (0 disables)
    pub debounce_ms: u64,
    /// Landmarks below this confidence (0.0-1.0) are treated as missing
    pub min_confidence: f32,
    /// Capacity of the observer event channel
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: ExerciseMode::Pushups,
            body_side: BodySide::Left,
            thresholds: RepThresholds::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_confidence: 0.0,
            event_buffer: 100,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it with
    /// defaults if it doesn't exist
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_or_create(&config_path)
    }

    /// Load from `path`, creating it with defaults if it doesn't exist
    pub fn load_or_create(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load from an existing file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        self.thresholds.validate().map_err(ConfigError::Invalid)?;

        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "Invalid debounce: {}ms. Must be at most {}ms",
                self.debounce_ms, MAX_DEBOUNCE_MS
            )));
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "Invalid minimum confidence: {}. Must be between 0.0 and 1.0",
                self.min_confidence
            )));
        }

        if self.event_buffer < MIN_EVENT_BUFFER {
            return Err(ConfigError::Invalid(format!(
                "Invalid event buffer: {}. Must hold at least {} events",
                self.event_buffer, MIN_EVENT_BUFFER
            )));
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> ConfigResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Frame processing settings derived from this config
    pub fn processor_config(&self) -> FrameProcessorConfig {
        FrameProcessorConfig {
            policy: RepPolicy {
                thresholds: self.thresholds,
                debounce_ms: self.debounce_ms,
            },
            body_side: self.body_side,
            min_confidence: self.min_confidence,
        }
    }

    /// Get the configuration file path
    pub fn get_config_path() -> ConfigResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDir)?;

        let mut path = PathBuf::from(home);
        path.push(".repcount");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
