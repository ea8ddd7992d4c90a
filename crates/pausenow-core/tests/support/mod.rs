//! Fake collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use pausenow_core::coordinator::Heartbeat;
use pausenow_core::{OverlayHandle, OverlayPresenter, OverlayRequest, ReminderType};

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterMode {
    /// Resolve as completed inside `present`.
    Complete,
    /// Resolve as skipped inside `present`.
    Skip,
    /// Keep the handle for the test to resolve later.
    Hold,
}

#[derive(Default)]
struct Recorded {
    requests: Vec<OverlayRequest>,
    held: Vec<OverlayHandle>,
}

#[derive(Clone)]
pub struct RecordingPresenter {
    mode: PresenterMode,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingPresenter {
    pub fn new(mode: PresenterMode) -> Self {
        Self {
            mode,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn boxed(&self) -> Box<dyn OverlayPresenter> {
        Box::new(self.clone())
    }

    pub fn presented_count(&self) -> usize {
        self.recorded.lock().unwrap().requests.len()
    }

    pub fn presented_events(&self) -> Vec<ReminderType> {
        self.recorded
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|r| r.reminder_type)
            .collect()
    }

    pub fn last_request(&self) -> Option<OverlayRequest> {
        self.recorded.lock().unwrap().requests.last().cloned()
    }

    /// Take the oldest held handle.
    pub fn take_handle(&self) -> Option<OverlayHandle> {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.held.is_empty() {
            None
        } else {
            Some(recorded.held.remove(0))
        }
    }
}

impl OverlayPresenter for RecordingPresenter {
    fn present(&mut self, request: OverlayRequest, handle: OverlayHandle) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.requests.push(request);
        match self.mode {
            PresenterMode::Complete => handle.complete(),
            PresenterMode::Skip => handle.skip(),
            PresenterMode::Hold => recorded.held.push(handle),
        }
    }
}

#[derive(Debug, Default)]
pub struct HeartbeatLog {
    pub scheduled: Option<StdDuration>,
    pub schedule_count: usize,
    pub cancel_count: usize,
}

/// Heartbeat whose calls stay observable after the coordinator takes ownership.
#[derive(Clone, Default)]
pub struct SharedHeartbeat(pub Arc<Mutex<HeartbeatLog>>);

impl SharedHeartbeat {
    pub fn log(&self) -> std::sync::MutexGuard<'_, HeartbeatLog> {
        self.0.lock().unwrap()
    }
}

impl Heartbeat for SharedHeartbeat {
    fn schedule(&mut self, period: StdDuration) {
        let mut log = self.0.lock().unwrap();
        log.scheduled = Some(period);
        log.schedule_count += 1;
    }

    fn cancel(&mut self) {
        let mut log = self.0.lock().unwrap();
        if log.scheduled.take().is_some() {
            log.cancel_count += 1;
        }
    }

    fn is_scheduled(&self) -> bool {
        self.0.lock().unwrap().scheduled.is_some()
    }
}
