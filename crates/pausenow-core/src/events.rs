use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::ReminderType;

/// Every coordinator state change produces an Event.
/// Presentation layers poll for them; the service records resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ReminderStarted {
        due_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderPaused {
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    ReminderResumed {
        due_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    ReminderPresented {
        reminder_type: ReminderType,
        duration_secs: u32,
        /// Triggered by the user rather than the timer.
        manual: bool,
        at: DateTime<Utc>,
    },
    ReminderCompleted {
        reminder_type: ReminderType,
        at: DateTime<Utc>,
    },
    ReminderSkipped {
        reminder_type: ReminderType,
        at: DateTime<Utc>,
    },
    ScheduleReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::ReminderStarted { at, .. }
            | Event::ReminderPaused { at, .. }
            | Event::ReminderResumed { at, .. }
            | Event::ReminderPresented { at, .. }
            | Event::ReminderCompleted { at, .. }
            | Event::ReminderSkipped { at, .. }
            | Event::ScheduleReset { at } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let event = Event::ReminderCompleted {
            reminder_type: ReminderType::Standup,
            at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "reminder_completed");
        assert_eq!(json["reminder_type"], "standup");
        assert_eq!(event.at(), at);
    }
}
