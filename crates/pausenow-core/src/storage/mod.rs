mod config;
mod provider;
pub mod records;

pub use config::{AppSettings, SettingsResetPolicy, DEFAULT_PROMPT_TEXT};
pub use provider::{FileSettings, SettingsProvider, SharedSettings};
pub use records::{DailyStats, RecordStore, ReminderRecord};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/pausenow[-dev]/` based on PAUSENOW_ENV.
///
/// Set PAUSENOW_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir().ok_or(ConfigError::NoDataDir)?.join(".config");

    let env = std::env::var("PAUSENOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pausenow-dev")
    } else {
        base_dir.join("pausenow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
