//! Settings sources consumed by the coordinator.
//!
//! The coordinator re-reads `current()` at every restart and cycle, so
//! providers must be cheap and must never hand out stale values across a
//! full timer cycle. Change notification is explicit: whoever edits the
//! settings calls `ReminderCoordinator::settings_changed` afterwards.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use super::config::AppSettings;

pub trait SettingsProvider: Send + Sync {
    fn current(&self) -> AppSettings;
}

/// In-memory settings shared between the host and the coordinator.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<RwLock<AppSettings>>);

impl SharedSettings {
    pub fn new(settings: AppSettings) -> Self {
        Self(Arc::new(RwLock::new(settings.sanitized())))
    }

    /// Store new settings and return the previous snapshot.
    pub fn replace(&self, settings: AppSettings) -> AppSettings {
        let mut guard = self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, settings.sanitized())
    }

    /// Mutate in place; returns `(old, new)`.
    pub fn update(&self, mutate: impl FnOnce(&mut AppSettings)) -> (AppSettings, AppSettings) {
        let mut next = self.current();
        mutate(&mut next);
        let old = self.replace(next);
        (old, self.current())
    }
}

impl SettingsProvider for SharedSettings {
    fn current(&self) -> AppSettings {
        self.0
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

/// Reads `config.toml` on every call; falls back to defaults when the file
/// is missing or malformed.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsProvider for FileSettings {
    fn current(&self) -> AppSettings {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match toml::from_str::<AppSettings>(&content) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "settings: malformed config, using defaults");
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        }
    }
}
