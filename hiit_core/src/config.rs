//! Configuration file support for hiit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/hiit/config.toml`.
//! Every section is optional; missing values fall back to the defaults the
//! timers have always used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub countdown: CountdownConfig,

    #[serde(default)]
    pub cues: CueConfig,

    #[serde(default)]
    pub tabata: TabataConfig,

    #[serde(default)]
    pub defaults: ModeDefaults,
}

/// Lead-in before work starts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountdownConfig {
    #[serde(default = "default_countdown_seconds")]
    pub seconds: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            seconds: default_countdown_seconds(),
        }
    }
}

/// Audio cue thresholds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CueConfig {
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: u32,

    #[serde(default = "default_midpoint_min_duration")]
    pub midpoint_min_duration: u32,

    #[serde(default = "default_countdown_beeps")]
    pub countdown_beeps: u32,

    #[serde(default = "default_true")]
    pub minute_marks: bool,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            warning_seconds: default_warning_seconds(),
            midpoint_min_duration: default_midpoint_min_duration(),
            countdown_beeps: default_countdown_beeps(),
            minute_marks: true,
        }
    }
}

/// TABATA-specific policy
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct TabataConfig {
    /// Keep the rest phase after the last round
    #[serde(default)]
    pub final_rest: bool,
}

/// Values used when a mode parameter is not given on the command line
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModeDefaults {
    #[serde(default = "default_amrap_minutes")]
    pub amrap_minutes: u32,
    #[serde(default = "default_amrap_work")]
    pub amrap_work: u32,
    #[serde(default = "default_amrap_rest")]
    pub amrap_rest: u32,

    #[serde(default = "default_emom_rounds")]
    pub emom_rounds: u32,
    #[serde(default = "default_emom_interval")]
    pub emom_interval: u32,

    #[serde(default = "default_tabata_rounds")]
    pub tabata_rounds: u32,
    #[serde(default = "default_tabata_work")]
    pub tabata_work: u32,
    #[serde(default = "default_tabata_rest")]
    pub tabata_rest: u32,

    #[serde(default = "default_for_time_rounds")]
    pub for_time_rounds: u32,
    #[serde(default = "default_for_time_rest")]
    pub for_time_rest: u32,
}

impl Default for ModeDefaults {
    fn default() -> Self {
        Self {
            amrap_minutes: default_amrap_minutes(),
            amrap_work: default_amrap_work(),
            amrap_rest: default_amrap_rest(),
            emom_rounds: default_emom_rounds(),
            emom_interval: default_emom_interval(),
            tabata_rounds: default_tabata_rounds(),
            tabata_work: default_tabata_work(),
            tabata_rest: default_tabata_rest(),
            for_time_rounds: default_for_time_rounds(),
            for_time_rest: default_for_time_rest(),
        }
    }
}

// Default value functions
fn default_countdown_seconds() -> u32 {
    crate::plan::DEFAULT_COUNTDOWN_SECONDS
}

fn default_warning_seconds() -> u32 {
    5
}

fn default_midpoint_min_duration() -> u32 {
    10
}

fn default_countdown_beeps() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_amrap_minutes() -> u32 {
    20
}

fn default_amrap_work() -> u32 {
    30
}

fn default_amrap_rest() -> u32 {
    10
}

fn default_emom_rounds() -> u32 {
    10
}

fn default_emom_interval() -> u32 {
    60
}

fn default_tabata_rounds() -> u32 {
    8
}

fn default_tabata_work() -> u32 {
    20
}

fn default_tabata_rest() -> u32 {
    10
}

fn default_for_time_rounds() -> u32 {
    5
}

fn default_for_time_rest() -> u32 {
    60
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::info!("No config file found at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                tracing::info!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("hiit").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings that would make cues meaningless
    pub fn validate(&self) -> Result<()> {
        if self.cues.warning_seconds == 0 {
            return Err(Error::Config("cues.warning_seconds must be at least 1".into()));
        }
        if self.countdown.seconds > 60 {
            return Err(Error::Config(format!(
                "countdown.seconds must be at most 60, got {}",
                self.countdown.seconds
            )));
        }
        Ok(())
    }
}
