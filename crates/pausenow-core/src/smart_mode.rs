//! System-state gates that suppress reminders without touching the timer.
//!
//! Two independent flags: the machine is asleep, or a fullscreen app asks us
//! to defer. The coordinator checks both on every tick; a suppressed tick is
//! simply retried on the next one.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct SmartModeMonitor {
    replay_delay: Duration,
    is_paused_by_system_state: bool,
    should_defer_reminder: bool,
}

impl SmartModeMonitor {
    /// Negative delays are clamped to zero.
    pub fn new(replay_delay: Duration) -> Self {
        Self {
            replay_delay: replay_delay.max(Duration::zero()),
            is_paused_by_system_state: false,
            should_defer_reminder: false,
        }
    }

    pub fn set_system_sleeping(&mut self, sleeping: bool) {
        self.is_paused_by_system_state = sleeping;
    }

    pub fn set_fullscreen(&mut self, enabled: bool) {
        self.should_defer_reminder = enabled;
    }

    pub fn is_paused_by_system_state(&self) -> bool {
        self.is_paused_by_system_state
    }

    pub fn should_defer_reminder(&self) -> bool {
        self.should_defer_reminder
    }

    /// Delay a presentation layer may wait before replaying a deferred reminder.
    /// Informational only; the coordinator retries on the next tick.
    pub fn scheduled_replay_delay(&self) -> Duration {
        self.replay_delay
    }

    /// Either gate is active.
    pub fn is_suppressing(&self) -> bool {
        self.is_paused_by_system_state || self.should_defer_reminder
    }
}

impl Default for SmartModeMonitor {
    fn default() -> Self {
        Self::new(Duration::seconds(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defers_in_fullscreen() {
        let mut monitor = SmartModeMonitor::default();
        monitor.set_fullscreen(true);
        assert!(monitor.should_defer_reminder());
        assert!(!monitor.is_paused_by_system_state());
    }

    #[test]
    fn pauses_and_resumes_by_sleep() {
        let mut monitor = SmartModeMonitor::default();
        monitor.set_system_sleeping(true);
        assert!(monitor.is_paused_by_system_state());

        monitor.set_system_sleeping(false);
        assert!(!monitor.is_paused_by_system_state());
    }

    #[test]
    fn gates_are_independent() {
        let mut monitor = SmartModeMonitor::default();
        monitor.set_system_sleeping(true);
        monitor.set_fullscreen(true);
        monitor.set_system_sleeping(false);
        assert!(monitor.should_defer_reminder());
        assert!(monitor.is_suppressing());

        monitor.set_fullscreen(false);
        assert!(!monitor.is_suppressing());
    }

    #[test]
    fn replay_delay_is_clamped() {
        assert_eq!(SmartModeMonitor::new(Duration::seconds(-5)).scheduled_replay_delay(), Duration::zero());
        assert_eq!(SmartModeMonitor::default().scheduled_replay_delay(), Duration::seconds(15));
    }
}
