//! TOML-based application configuration.
//!
//! Stores:
//! - Streak engine settings (walk-back bound)
//! - Habit display defaults (new-habit color)
//!
//! Configuration is stored at `~/.config/habitkit/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Streak engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreaksConfig {
    /// Hard cap on the current-streak backward walk, in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

/// Habit display defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitsConfig {
    /// Color assigned to habits created without an explicit one.
    #[serde(default = "default_habit_color")]
    pub default_color: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitkit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streaks: StreaksConfig,
    #[serde(default)]
    pub habits: HabitsConfig,
}

fn default_lookback_days() -> u32 {
    365
}

fn default_habit_color() -> String {
    "#FFB4A2".into()
}

impl Default for StreaksConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for HabitsConfig {
    fn default() -> Self {
        Self {
            default_color: default_habit_color(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            streaks: StreaksConfig::default(),
            habits: HabitsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/habitkit"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults if the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Save the configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Set a configuration value by dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "streaks.lookback_days" => {
                self.streaks.lookback_days =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as a day count"),
                    })?;
                Ok(())
            }
            "habits.default_color" => {
                self.habits.default_color = value.to_string();
                Ok(())
            }
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.streaks.lookback_days, 365);
        assert_eq!(config.habits.default_color, "#FFB4A2");
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.streaks.lookback_days = 90;
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.streaks.lookback_days, 90);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[streaks]\nlookback_days = 30\n").unwrap();
        assert_eq!(parsed.streaks.lookback_days, 30);
        assert_eq!(parsed.habits.default_color, "#FFB4A2");
    }

    #[test]
    fn set_by_key() {
        let mut config = Config::default();
        config.set("streaks.lookback_days", "180").unwrap();
        assert_eq!(config.streaks.lookback_days, 180);
        config.set("habits.default_color", "#123456").unwrap();
        assert_eq!(config.habits.default_color, "#123456");
        assert!(config.set("streaks.lookback_days", "soon").is_err());
        assert!(config.set("window.pinned", "true").is_err());
    }
}
