//! Due-date timer for the next reminder.
//!
//! The timer is a wall-clock state machine with no internal thread. It holds
//! an absolute due date; the caller compares it with "now" on each tick.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Armed -> (Paused -> Armed)* -> Idle
//! ```
//!
//! While paused the due date is frozen as a reference point and the remaining
//! time is held separately. Callers must treat `paused_remaining().is_some()`
//! as "paused", not the due date alone.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Armed,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    eye_break_interval: Duration,
}

impl TimerConfig {
    /// Intervals shorter than one second are clamped to one second.
    pub fn new(eye_break_interval: Duration) -> Self {
        Self {
            eye_break_interval: eye_break_interval.max(Duration::seconds(1)),
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    pub fn eye_break_interval(&self) -> Duration {
        self.eye_break_interval
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::from_minutes(20)
    }
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    interval: Duration,
    next_due_date: Option<DateTime<Utc>>,
    paused_remaining: Option<Duration>,
}

impl TimerEngine {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            interval: config.eye_break_interval(),
            next_due_date: None,
            paused_remaining: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn next_due_date(&self) -> Option<DateTime<Utc>> {
        self.next_due_date
    }

    pub fn paused_remaining(&self) -> Option<Duration> {
        self.paused_remaining
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.next_due_date, self.paused_remaining) {
            (_, Some(_)) => TimerPhase::Paused,
            (Some(_), None) => TimerPhase::Armed,
            (None, None) => TimerPhase::Idle,
        }
    }

    /// True when armed and the due date has been reached.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.paused_remaining.is_none() && self.next_due_date.is_some_and(|due| now >= due)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the timer one interval from `now`. Restarts unconditionally.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due_date = Some(now + self.interval);
        self.paused_remaining = None;
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        let Some(due) = self.next_due_date else {
            return;
        };
        self.paused_remaining = Some((due - now).max(Duration::zero()));
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        let Some(remaining) = self.paused_remaining.take() else {
            return;
        };
        self.next_due_date = Some(now + remaining);
    }

    pub fn reset(&mut self) {
        self.next_due_date = None;
        self.paused_remaining = None;
    }
}
