mod config;
pub mod habit_db;
pub mod migrations;

pub use config::{Config, HabitsConfig, StreaksConfig};
pub use habit_db::HabitDb;

use std::path::PathBuf;

/// Returns `~/.config/habitkit[-dev]/` based on HABITKIT_ENV.
///
/// Set HABITKIT_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITKIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitkit-dev")
    } else {
        base_dir.join("habitkit")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
