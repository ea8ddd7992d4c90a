//! Cyclic reminder policy.
//!
//! The engine keeps a single counter of eye breaks completed in the current
//! cycle. Predicting the next reminder never mutates it; only a resolved
//! presentation does (via [`RuleEngine::mark_completed`]).
//!
//! With `standup_every_eye_breaks = 3` the sequence of predictions is
//! `eye_break, eye_break, standup, eye_break, ...`: the boundary check treats
//! the counter as if the pending reminder had already completed.

use chrono::{DateTime, Utc};

use super::{ReminderEvent, ReminderType, RuleConfig};

#[derive(Debug, Clone)]
pub struct RuleEngine {
    config: RuleConfig,
    completed_eye_breaks_in_cycle: u32,
}

impl RuleEngine {
    pub fn new(config: RuleConfig) -> Self {
        Self {
            config,
            completed_eye_breaks_in_cycle: 0,
        }
    }

    pub fn config(&self) -> RuleConfig {
        self.config
    }

    pub fn completed_eye_breaks_in_cycle(&self) -> u32 {
        self.completed_eye_breaks_in_cycle
    }

    /// Predict the type of the next reminder without consuming the cycle.
    pub fn next_event(&self, now: DateTime<Utc>) -> ReminderEvent {
        let every = self.config.standup_every_eye_breaks();
        let hits_boundary = (self.completed_eye_breaks_in_cycle.saturating_add(1)) % every == 0;
        let reminder_type = if hits_boundary {
            ReminderType::Standup
        } else {
            ReminderType::EyeBreak
        };
        ReminderEvent {
            reminder_type,
            due_at: now,
        }
    }

    /// Record a resolved reminder. Must be called once per completed presentation.
    pub fn mark_completed(&mut self, reminder_type: ReminderType) {
        match reminder_type {
            ReminderType::EyeBreak => {
                self.completed_eye_breaks_in_cycle =
                    self.completed_eye_breaks_in_cycle.saturating_add(1);
            }
            ReminderType::Standup => self.completed_eye_breaks_in_cycle = 0,
        }
    }

    /// Seed the counter with extra completed eye breaks. Zero is a no-op.
    pub fn mark_eye_break_completed(&mut self, times: u32) {
        if times == 0 {
            return;
        }
        self.completed_eye_breaks_in_cycle = self.completed_eye_breaks_in_cycle.saturating_add(times);
    }

    /// Swap the cycle length while keeping progress in the current cycle.
    pub fn apply_config_without_reset(&mut self, config: RuleConfig) {
        self.config = config;
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}
