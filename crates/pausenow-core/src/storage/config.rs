//! TOML-based reminder settings.
//!
//! Stores the reminder cadence and durations:
//! - Eye-break interval (minutes) and eye-break length (seconds)
//! - How many eye breaks make up a cycle before a standup
//! - Standup length (seconds)
//! - Prompt text shown on the break overlay
//!
//! Settings are stored at `~/.config/pausenow/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::reminder::{ReminderType, RuleConfig};
use crate::timer::TimerConfig;

pub const DEFAULT_PROMPT_TEXT: &str = "现在稍息！";

/// Application settings.
///
/// Serialized to/from TOML at `~/.config/pausenow/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_eye_break_interval_minutes")]
    pub eye_break_interval_minutes: u32,
    #[serde(default = "default_eye_break_seconds")]
    pub eye_break_seconds: u32,
    #[serde(default = "default_standup_every_eye_breaks")]
    pub standup_every_eye_breaks: u32,
    #[serde(default = "default_standup_seconds")]
    pub standup_seconds: u32,
    #[serde(default = "default_prompt_text")]
    pub default_prompt_text: String,
    /// Seconds a presentation layer may wait before replaying a deferred reminder.
    #[serde(default = "default_replay_delay_seconds")]
    pub replay_delay_seconds: u32,
}

// Default functions
fn default_eye_break_interval_minutes() -> u32 {
    20
}
fn default_eye_break_seconds() -> u32 {
    20
}
fn default_standup_every_eye_breaks() -> u32 {
    3
}
fn default_standup_seconds() -> u32 {
    180
}
fn default_prompt_text() -> String {
    DEFAULT_PROMPT_TEXT.into()
}
fn default_replay_delay_seconds() -> u32 {
    15
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            eye_break_interval_minutes: default_eye_break_interval_minutes(),
            eye_break_seconds: default_eye_break_seconds(),
            standup_every_eye_breaks: default_standup_every_eye_breaks(),
            standup_seconds: default_standup_seconds(),
            default_prompt_text: default_prompt_text(),
            replay_delay_seconds: default_replay_delay_seconds(),
        }
    }
}

impl AppSettings {
    /// Clamp numeric values to at least 1 and fall back to the default prompt
    /// when the prompt is blank.
    pub fn sanitized(&self) -> Self {
        let prompt = self.default_prompt_text.trim();
        Self {
            eye_break_interval_minutes: self.eye_break_interval_minutes.max(1),
            eye_break_seconds: self.eye_break_seconds.max(1),
            standup_every_eye_breaks: self.standup_every_eye_breaks.max(1),
            standup_seconds: self.standup_seconds.max(1),
            default_prompt_text: if prompt.is_empty() {
                default_prompt_text()
            } else {
                prompt.to_string()
            },
            replay_delay_seconds: self.replay_delay_seconds,
        }
    }

    pub fn rule_config(&self) -> RuleConfig {
        RuleConfig::new(self.standup_every_eye_breaks)
    }

    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::from_minutes(self.eye_break_interval_minutes)
    }

    /// Overlay length for a reminder of the given type.
    pub fn duration_secs(&self, reminder_type: ReminderType) -> u32 {
        match reminder_type {
            ReminderType::EyeBreak => self.eye_break_seconds,
            ReminderType::Standup => self.standup_seconds,
        }
    }

    /// Location of `config.toml` inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return (and write) the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the default cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: AppSettings = toml::from_str(&content)?;
                Ok(cfg.sanitized())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&self.sanitized()).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value in memory, keeping the field's type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Number(_) => {
                let n = value.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
                serde_json::Value::Number(n.into())
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(key.to_string(), new_value);

        let parsed: AppSettings = serde_json::from_value(json)?;
        *self = parsed.sanitized();
        Ok(())
    }
}

/// Decides whether a settings edit must restart the schedule.
///
/// Only a change to the base interval invalidates the running countdown;
/// every other field is applied live.
pub struct SettingsResetPolicy;

impl SettingsResetPolicy {
    pub fn should_reset(old: &AppSettings, new: &AppSettings) -> bool {
        old.eye_break_interval_minutes != new.eye_break_interval_minutes
    }
}
