//! Async runtime for the coordinator.
//!
//! One tokio task owns the [`ReminderCoordinator`] and is the only place its
//! methods run. UI calls arrive as [`Command`]s over an mpsc channel, the
//! heartbeat arrives as ticks from an [`IntervalHeartbeat`], and overlay
//! resolutions arrive from whatever thread the presenter used. All three are
//! serialized by a single `select!` loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::coordinator::{
    Clock, IntervalHeartbeat, OverlayPresenter, OverlayResolution, ReminderCoordinator,
    RuntimeState,
};
use crate::display::DisplaySnapshot;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::reminder::ReminderOutcome;
use crate::storage::{AppSettings, RecordStore, SettingsProvider};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

#[derive(Debug)]
enum Command {
    Toggle,
    Start,
    Pause,
    Resume,
    ManualBreak,
    Reset,
    SettingsChanged {
        old: Box<AppSettings>,
        new: Box<AppSettings>,
    },
    SetSystemSleeping(bool),
    SetFullscreen(bool),
    Status(oneshot::Sender<ServiceStatus>),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub state: RuntimeState,
    pub next_due_date: Option<DateTime<Utc>>,
    pub overlay_in_flight: bool,
    pub snapshot: DisplaySnapshot,
}

/// Cloneable, `Send` front door to a running service.
#[derive(Debug, Clone)]
pub struct ReminderHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

impl ReminderHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::ServiceStopped)
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle).await
    }

    pub async fn start(&self) -> Result<()> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(Command::Resume).await
    }

    pub async fn manual_break(&self) -> Result<()> {
        self.send(Command::ManualBreak).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    pub async fn settings_changed(&self, old: AppSettings, new: AppSettings) -> Result<()> {
        self.send(Command::SettingsChanged {
            old: Box::new(old),
            new: Box::new(new),
        })
        .await
    }

    pub async fn set_system_sleeping(&self, sleeping: bool) -> Result<()> {
        self.send(Command::SetSystemSleeping(sleeping)).await
    }

    pub async fn set_fullscreen(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetFullscreen(enabled)).await
    }

    pub async fn status(&self) -> Result<ServiceStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx)).await?;
        rx.await.map_err(|_| CoreError::ServiceStopped)
    }

    pub async fn snapshot(&self) -> Result<DisplaySnapshot> {
        Ok(self.status().await?.snapshot)
    }

    pub async fn state(&self) -> Result<RuntimeState> {
        Ok(self.status().await?.state)
    }

    /// Stop the service. The coordinator is dropped, which cancels its heartbeat.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Receive every event the coordinator produces from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

pub struct ReminderService {
    coordinator: ReminderCoordinator,
    clock: Arc<dyn Clock>,
    records: Option<RecordStore>,
    events: broadcast::Sender<Event>,
}

impl ReminderService {
    /// Spawn the service on the current tokio runtime.
    pub fn spawn(
        settings: Arc<dyn SettingsProvider>,
        presenter: Box<dyn OverlayPresenter>,
        clock: Arc<dyn Clock>,
        records: Option<RecordStore>,
    ) -> (ReminderHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let mut coordinator = ReminderCoordinator::new(settings, presenter)
            .with_clock(clock.clone())
            .with_heartbeat(Box::new(IntervalHeartbeat::new(tick_tx)));
        let resolutions = coordinator.take_resolution_receiver();

        let service = Self {
            coordinator,
            clock,
            records,
            events: event_tx.clone(),
        };
        let task = tokio::spawn(service.run(command_rx, tick_rx, resolutions));

        (
            ReminderHandle {
                commands: command_tx,
                events: event_tx,
            },
            task,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut ticks: mpsc::Receiver<()>,
        mut resolutions: Option<mpsc::UnboundedReceiver<OverlayResolution>>,
    ) {
        debug!("service: started");
        loop {
            // Resolutions first, so one sent just before a command is applied before it.
            tokio::select! {
                biased;
                Some(resolution) = recv_resolution(&mut resolutions) => {
                    self.coordinator.resolve_overlay(resolution);
                }
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                Some(()) = ticks.recv() => {
                    let now = self.clock.now();
                    self.coordinator.process_tick(now);
                }
            }
            self.flush_events();
        }
        debug!("service: stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Toggle => self.coordinator.toggle_primary_action(),
            Command::Start => self.coordinator.start(),
            Command::Pause => self.coordinator.pause(),
            Command::Resume => self.coordinator.resume(),
            Command::ManualBreak => self.coordinator.manual_break_by_cycle(None),
            Command::Reset => self.coordinator.reset_schedule(),
            Command::SettingsChanged { old, new } => self.coordinator.settings_changed(&old, &new),
            Command::SetSystemSleeping(sleeping) => self.coordinator.set_system_sleeping(sleeping),
            Command::SetFullscreen(enabled) => self.coordinator.set_fullscreen(enabled),
            Command::Status(reply) => {
                let now = self.clock.now();
                let status = ServiceStatus {
                    state: self.coordinator.state(),
                    next_due_date: self.coordinator.next_due_date(),
                    overlay_in_flight: self.coordinator.is_overlay_in_flight(),
                    snapshot: self.coordinator.display_snapshot(now),
                };
                // Caller may have given up waiting.
                let _ = reply.send(status);
            }
            Command::Shutdown => {}
        }
    }

    fn flush_events(&mut self) {
        for event in self.coordinator.drain_events() {
            self.record(&event);
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn record(&self, event: &Event) {
        let Some(records) = self.records.as_ref() else {
            return;
        };
        let (reminder_type, outcome, at) = match event {
            Event::ReminderCompleted { reminder_type, at } => {
                (*reminder_type, ReminderOutcome::Completed, *at)
            }
            Event::ReminderSkipped { reminder_type, at } => {
                (*reminder_type, ReminderOutcome::Skipped, *at)
            }
            _ => return,
        };
        if let Err(e) = records.append(reminder_type, outcome, at) {
            warn!(error = %e, "service: failed to record reminder outcome");
        }
    }
}

async fn recv_resolution<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
