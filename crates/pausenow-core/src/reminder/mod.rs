//! Reminder types and the cyclic eye-break / standup rule.

mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use rules::RuleEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    /// Short look-away break, presented on every interval.
    EyeBreak,
    /// Longer break that replaces every Nth eye break.
    Standup,
}

impl ReminderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderType::EyeBreak => "eye_break",
            ReminderType::Standup => "standup",
        }
    }
}

impl std::fmt::Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the user resolved a presented reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderOutcome {
    Completed,
    Skipped,
}

impl ReminderOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderOutcome::Completed => "completed",
            ReminderOutcome::Skipped => "skipped",
        }
    }
}

/// A predicted reminder. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub reminder_type: ReminderType,
    pub due_at: DateTime<Utc>,
}

/// Cycle configuration for the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    standup_every_eye_breaks: u32,
}

impl RuleConfig {
    /// Values below 1 are clamped to 1.
    pub fn new(standup_every_eye_breaks: u32) -> Self {
        Self {
            standup_every_eye_breaks: standup_every_eye_breaks.max(1),
        }
    }

    pub fn standup_every_eye_breaks(&self) -> u32 {
        self.standup_every_eye_breaks
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_config_clamps_zero_to_one() {
        assert_eq!(RuleConfig::new(0).standup_every_eye_breaks(), 1);
        assert_eq!(RuleConfig::default().standup_every_eye_breaks(), 3);
    }

    #[test]
    fn reminder_type_serializes_snake_case() {
        let json = serde_json::to_string(&ReminderType::EyeBreak).unwrap();
        assert_eq!(json, "\"eye_break\"");
        assert_eq!(ReminderType::Standup.to_string(), "standup");
    }
}
