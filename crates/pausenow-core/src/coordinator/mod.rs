//! Reminder coordinator.
//!
//! The coordinator ties the rule engine, the due-date timer and the
//! smart-mode gates together. It is a synchronous state machine: every
//! method returns immediately and invalid calls are silent no-ops, because
//! it is driven by a timer loop that must never halt on a spurious call.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running <-> Paused
//!    ^          |          |
//!    +---- reset_schedule -+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut coordinator = ReminderCoordinator::new(settings, presenter);
//! coordinator.start();
//! // Once per second:
//! coordinator.process_tick(clock.now());
//! ```
//!
//! At most one overlay is in flight at a time. While one is showing, ticks
//! and manual breaks are ignored; the presenter resolves it through its
//! [`OverlayHandle`], after which a fresh timer cycle starts from "now".

mod clock;
mod heartbeat;
mod overlay;

pub use clock::{Clock, ManualClock, SystemClock};
pub use heartbeat::{Heartbeat, IntervalHeartbeat, ManualHeartbeat, HEARTBEAT_PERIOD};
pub use overlay::{OverlayHandle, OverlayPresenter, OverlayRequest, OverlayResolution};

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::display::{DisplaySnapshot, ReminderDisplayMapper};
use crate::events::Event;
use crate::reminder::{ReminderOutcome, ReminderType, RuleEngine};
use crate::smart_mode::SmartModeMonitor;
use crate::storage::{AppSettings, SettingsProvider, SettingsResetPolicy};
use crate::timer::TimerEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    presentation_id: u64,
    reminder_type: ReminderType,
}

pub struct ReminderCoordinator {
    settings: Arc<dyn SettingsProvider>,
    presenter: Box<dyn OverlayPresenter>,
    clock: Arc<dyn Clock>,
    heartbeat: Box<dyn Heartbeat>,
    smart_mode: SmartModeMonitor,
    rules: RuleEngine,
    timer: TimerEngine,
    state: RuntimeState,
    in_flight: Option<InFlight>,
    next_presentation_id: u64,
    resolution_tx: mpsc::UnboundedSender<OverlayResolution>,
    resolution_rx: Option<mpsc::UnboundedReceiver<OverlayResolution>>,
    events: Vec<Event>,
}

impl ReminderCoordinator {
    /// Create a stopped coordinator with the system clock and a
    /// [`ManualHeartbeat`]. Use the `with_*` methods to swap collaborators.
    pub fn new(settings: Arc<dyn SettingsProvider>, presenter: Box<dyn OverlayPresenter>) -> Self {
        let current = settings.current();
        let (resolution_tx, resolution_rx) = mpsc::unbounded_channel();
        Self {
            smart_mode: SmartModeMonitor::new(Duration::seconds(i64::from(
                current.replay_delay_seconds,
            ))),
            rules: RuleEngine::new(current.rule_config()),
            timer: TimerEngine::new(current.timer_config()),
            settings,
            presenter,
            clock: Arc::new(SystemClock),
            heartbeat: Box::new(ManualHeartbeat::new()),
            state: RuntimeState::Stopped,
            in_flight: None,
            next_presentation_id: 1,
            resolution_tx,
            resolution_rx: Some(resolution_rx),
            events: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: Box<dyn Heartbeat>) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn with_smart_mode(mut self, smart_mode: SmartModeMonitor) -> Self {
        self.smart_mode = smart_mode;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn next_due_date(&self) -> Option<DateTime<Utc>> {
        self.timer.next_due_date()
    }

    pub fn paused_remaining(&self) -> Option<Duration> {
        self.timer.paused_remaining()
    }

    pub fn is_overlay_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn smart_mode(&self) -> &SmartModeMonitor {
        &self.smart_mode
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn heartbeat(&self) -> &dyn Heartbeat {
        self.heartbeat.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Display snapshot for the current state at `now`.
    pub fn display_snapshot(&self, now: DateTime<Utc>) -> DisplaySnapshot {
        ReminderDisplayMapper::build(
            self.state,
            self.timer.next_due_date(),
            self.timer.paused_remaining(),
            &self.settings.current(),
            now,
        )
    }

    /// Hand out buffered events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.drain_resolutions();
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) {
        self.drain_resolutions();
        let now = self.clock.now();
        match self.state {
            RuntimeState::Stopped => {
                self.reset_runtime();
                self.timer.start(now);
                self.begin_heartbeat_if_needed();
                debug!("coordinator: start from stopped");
                self.push_started(now);
            }
            RuntimeState::Paused => {
                self.timer.resume(now);
                debug!("coordinator: resume from paused");
                self.events.push(Event::ReminderResumed {
                    due_at: self.timer.next_due_date(),
                    at: now,
                });
            }
            RuntimeState::Running => return,
        }
        self.state = RuntimeState::Running;
    }

    /// Single-button affordance: start, pause or resume.
    pub fn toggle_primary_action(&mut self) {
        match self.state {
            RuntimeState::Stopped => self.start(),
            RuntimeState::Running => self.pause(),
            RuntimeState::Paused => self.resume(),
        }
    }

    pub fn pause(&mut self) {
        self.drain_resolutions();
        if self.state != RuntimeState::Running {
            return;
        }
        let now = self.clock.now();
        self.timer.pause(now);
        self.state = RuntimeState::Paused;
        debug!("coordinator: pause");
        self.events.push(Event::ReminderPaused {
            remaining_secs: self
                .timer
                .paused_remaining()
                .map(|d| d.num_seconds())
                .unwrap_or(0),
            at: now,
        });
    }

    pub fn resume(&mut self) {
        self.drain_resolutions();
        if self.state != RuntimeState::Paused {
            return;
        }
        let now = self.clock.now();
        self.timer.resume(now);
        self.state = RuntimeState::Running;
        debug!("coordinator: resume");
        self.events.push(Event::ReminderResumed {
            due_at: self.timer.next_due_date(),
            at: now,
        });
    }

    /// Heartbeat. Presents the predicted reminder once the due date is
    /// reached, unless something blocks it; a blocked tick changes nothing
    /// and the same due reminder is retried on the next tick.
    pub fn process_tick(&mut self, now: DateTime<Utc>) {
        self.drain_resolutions();
        if self.state != RuntimeState::Running || self.in_flight.is_some() {
            return;
        }
        if self.smart_mode.is_paused_by_system_state() {
            return;
        }
        if self.smart_mode.should_defer_reminder() {
            return;
        }
        match self.timer.next_due_date() {
            Some(due) if now >= due => {}
            _ => return,
        }

        let event = self.rules.next_event(now);
        debug!(reminder_type = %event.reminder_type, "coordinator: trigger event");
        self.present(event.reminder_type, false, now);
    }

    /// Present the next reminder of the cycle right away, ignoring the
    /// timer. Starts the coordinator first when stopped.
    pub fn manual_break_by_cycle(&mut self, now: Option<DateTime<Utc>>) {
        self.drain_resolutions();
        if self.in_flight.is_some() {
            return;
        }
        if self.state == RuntimeState::Stopped {
            self.reset_runtime();
            self.begin_heartbeat_if_needed();
            self.state = RuntimeState::Running;
            debug!("coordinator: manual break while stopped, move to running");
        }

        let event_time = now.unwrap_or_else(|| self.clock.now());
        let event = self.rules.next_event(event_time);
        self.present(event.reminder_type, true, event_time);
    }

    /// Back to a stopped baseline: cycle counter and due date both cleared.
    pub fn reset_schedule(&mut self) {
        self.drain_resolutions();
        self.state = RuntimeState::Stopped;
        self.in_flight = None;
        self.reset_runtime();
        debug!("coordinator: reset schedule");
        self.events.push(Event::ScheduleReset {
            at: self.clock.now(),
        });
    }

    /// Re-read settings and apply the cycle length only. The timer and its
    /// due date are left alone.
    pub fn apply_settings_without_reset(&mut self) {
        self.drain_resolutions();
        let current = self.settings.current();
        self.rules.apply_config_without_reset(current.rule_config());
        debug!(
            standup_every = current.standup_every_eye_breaks,
            "coordinator: settings applied without reset"
        );
    }

    /// React to a settings edit: a new base interval resets the schedule,
    /// anything else is applied live.
    pub fn settings_changed(&mut self, old: &AppSettings, new: &AppSettings) {
        if SettingsResetPolicy::should_reset(old, new) {
            self.reset_schedule();
        } else {
            self.apply_settings_without_reset();
        }
    }

    pub fn set_system_sleeping(&mut self, sleeping: bool) {
        self.smart_mode.set_system_sleeping(sleeping);
        debug!(sleeping, "coordinator: system sleep state changed");
    }

    pub fn set_fullscreen(&mut self, enabled: bool) {
        self.smart_mode.set_fullscreen(enabled);
        debug!(enabled, "coordinator: fullscreen state changed");
    }

    // ── Overlay resolution ───────────────────────────────────────────

    /// Take the resolution channel so an async host can await it and feed
    /// results to [`Self::resolve_overlay`]. Afterwards the coordinator no
    /// longer drains it on its own.
    pub fn take_resolution_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<OverlayResolution>> {
        self.resolution_rx.take()
    }

    /// Apply a presenter's resolution. Resolutions for anything but the
    /// overlay currently in flight are ignored.
    pub fn resolve_overlay(&mut self, resolution: OverlayResolution) {
        let Some(in_flight) = self.in_flight else {
            warn!(
                presentation_id = resolution.presentation_id,
                "coordinator: resolution with no overlay in flight"
            );
            return;
        };
        if in_flight.presentation_id != resolution.presentation_id {
            warn!(
                presentation_id = resolution.presentation_id,
                expected = in_flight.presentation_id,
                "coordinator: stale overlay resolution"
            );
            return;
        }

        let now = self.clock.now();
        match resolution.outcome {
            ReminderOutcome::Completed => {
                self.rules.mark_completed(in_flight.reminder_type);
                self.complete_overlay_and_restart_timer(now);
                debug!(reminder_type = %in_flight.reminder_type, "coordinator: overlay completed");
                self.events.push(Event::ReminderCompleted {
                    reminder_type: in_flight.reminder_type,
                    at: now,
                });
            }
            ReminderOutcome::Skipped => {
                self.complete_overlay_and_restart_timer(now);
                debug!(reminder_type = %in_flight.reminder_type, "coordinator: overlay skipped");
                self.events.push(Event::ReminderSkipped {
                    reminder_type: in_flight.reminder_type,
                    at: now,
                });
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn drain_resolutions(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = self.resolution_rx.as_mut() {
            while let Ok(resolution) = rx.try_recv() {
                pending.push(resolution);
            }
        }
        for resolution in pending {
            self.resolve_overlay(resolution);
        }
    }

    fn present(&mut self, reminder_type: ReminderType, manual: bool, now: DateTime<Utc>) {
        let settings = self.settings.current();
        let duration_secs = settings.duration_secs(reminder_type);
        let presentation_id = self.next_presentation_id;
        self.next_presentation_id += 1;

        self.in_flight = Some(InFlight {
            presentation_id,
            reminder_type,
        });
        self.events.push(Event::ReminderPresented {
            reminder_type,
            duration_secs,
            manual,
            at: now,
        });

        let request = OverlayRequest {
            presentation_id,
            reminder_type,
            duration_secs,
            prompt: settings.default_prompt_text,
        };
        let handle = OverlayHandle::new(presentation_id, self.resolution_tx.clone());
        self.presenter.present(request, handle);

        // Presenters that resolve synchronously are applied right away.
        self.drain_resolutions();
    }

    fn reset_runtime(&mut self) {
        let current = self.settings.current();
        self.rules = RuleEngine::new(current.rule_config());
        self.timer = TimerEngine::new(current.timer_config());
    }

    fn complete_overlay_and_restart_timer(&mut self, now: DateTime<Utc>) {
        self.in_flight = None;
        self.timer = TimerEngine::new(self.settings.current().timer_config());
        self.timer.start(now);
    }

    fn begin_heartbeat_if_needed(&mut self) {
        if self.heartbeat.is_scheduled() {
            return;
        }
        self.heartbeat.schedule(HEARTBEAT_PERIOD);
    }

    fn push_started(&mut self, now: DateTime<Utc>) {
        if let Some(due_at) = self.timer.next_due_date() {
            self.events.push(Event::ReminderStarted { due_at, at: now });
        }
    }
}

impl Drop for ReminderCoordinator {
    fn drop(&mut self) {
        self.heartbeat.cancel();
    }
}
