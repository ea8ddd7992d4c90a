//! Repeating-task capability that drives `process_tick`.
//!
//! The coordinator only asks for a schedule and cancels it on teardown; who
//! actually calls `process_tick` is up to the host. [`ManualHeartbeat`] is
//! for hosts that already own a loop (and for tests); [`IntervalHeartbeat`]
//! runs a tokio interval and posts a tick message per period.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(1);

pub trait Heartbeat: Send {
    fn schedule(&mut self, period: Duration);
    fn cancel(&mut self);
    fn is_scheduled(&self) -> bool;
}

/// Remembers whether a schedule is active; ticks are delivered by the caller.
#[derive(Debug, Default)]
pub struct ManualHeartbeat {
    period: Option<Duration>,
}

impl ManualHeartbeat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Heartbeat for ManualHeartbeat {
    fn schedule(&mut self, period: Duration) {
        self.period = Some(period);
    }

    fn cancel(&mut self) {
        self.period = None;
    }

    fn is_scheduled(&self) -> bool {
        self.period.is_some()
    }
}

/// Tokio-backed heartbeat. Each period it posts `()` into `ticks`; a full
/// channel drops the tick, so a slow consumer sees coalesced ticks.
///
/// `schedule` must be called from within a tokio runtime.
#[derive(Debug)]
pub struct IntervalHeartbeat {
    ticks: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl IntervalHeartbeat {
    pub fn new(ticks: mpsc::Sender<()>) -> Self {
        Self { ticks, task: None }
    }
}

impl Heartbeat for IntervalHeartbeat {
    fn schedule(&mut self, period: Duration) {
        self.cancel();
        let ticks = self.ticks.clone();
        self.task = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(mpsc::error::TrySendError::Closed(())) = ticks.try_send(()) {
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_scheduled(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for IntervalHeartbeat {
    fn drop(&mut self) {
        self.cancel();
    }
}
