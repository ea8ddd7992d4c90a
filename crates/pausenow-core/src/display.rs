//! Display snapshots for presentation layers.
//!
//! [`ReminderDisplayMapper::build`] is a pure function of its inputs, so a
//! status bar or popover can poll it (or be pushed its output) without any
//! framework-specific binding. Identical inputs always yield identical
//! snapshots.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinator::RuntimeState;
use crate::storage::AppSettings;

/// Status-bar state. Every runtime state renders as a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuBarDisplayState {
    Countdown { remaining_secs: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeDisplayModel {
    pub remaining_text: String,
    /// 0.0 .. 1.0 fraction of the interval still remaining.
    pub sand_progress: f64,
    pub is_flowing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub menu_bar_state: MenuBarDisplayState,
    pub home: HomeDisplayModel,
}

impl DisplaySnapshot {
    pub fn remaining_secs(&self) -> f64 {
        match self.menu_bar_state {
            MenuBarDisplayState::Countdown { remaining_secs } => remaining_secs,
        }
    }
}

/// `MM:SS`, seconds rounded down, negatives shown as `00:00`.
pub fn countdown_text(remaining_secs: f64) -> String {
    let seconds = remaining_secs.floor().max(0.0) as u64;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub struct ReminderDisplayMapper;

impl ReminderDisplayMapper {
    pub fn build(
        runtime_state: RuntimeState,
        next_due_date: Option<DateTime<Utc>>,
        paused_remaining: Option<Duration>,
        settings: &AppSettings,
        now: DateTime<Utc>,
    ) -> DisplaySnapshot {
        let total_duration = f64::from(settings.eye_break_interval_minutes.max(1)) * 60.0;

        let (remaining, is_flowing) = match runtime_state {
            RuntimeState::Stopped => (total_duration, false),
            RuntimeState::Running => {
                let remaining = match next_due_date {
                    Some(due) => seconds_f64(due - now).max(0.0),
                    None => total_duration,
                };
                (remaining, true)
            }
            RuntimeState::Paused => {
                let remaining = paused_remaining.map(seconds_f64).unwrap_or(total_duration);
                (remaining.max(0.0), false)
            }
        };

        let sand_progress = if total_duration > 0.0 {
            (remaining / total_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        DisplaySnapshot {
            menu_bar_state: MenuBarDisplayState::Countdown {
                remaining_secs: remaining,
            },
            home: HomeDisplayModel {
                remaining_text: countdown_text(remaining),
                sand_progress,
                is_flowing,
            },
        }
    }
}

fn seconds_f64(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}
