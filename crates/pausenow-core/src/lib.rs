//! # PauseNow Core Library
//!
//! This library provides the reminder scheduling engine behind PauseNow, a
//! break reminder that alternates short eye breaks with longer standups.
//! Presentation (status bar, popover, overlay window) lives outside; it talks
//! to the engine through narrow traits and polls display snapshots.
//!
//! ## Architecture
//!
//! - **Rule Engine**: pure cyclic policy deciding eye break vs. standup
//! - **Timer Engine**: a single due date that survives pause and resume
//! - **Smart Mode**: sleep and fullscreen gates that suppress triggering
//! - **Coordinator**: the stopped/running/paused state machine that turns a
//!   due timer into a presented reminder, one at a time
//! - **Service**: a tokio task that owns the coordinator and serializes
//!   every call onto it
//! - **Storage**: TOML settings and SQLite reminder history
//!
//! ## Key Components
//!
//! - [`ReminderCoordinator`]: Core state machine
//! - [`ReminderDisplayMapper`]: Pure display snapshot builder
//! - [`AppSettings`]: Reminder configuration
//! - [`RecordStore`]: Completed/skipped reminder history

pub mod coordinator;
pub mod display;
pub mod error;
pub mod events;
pub mod reminder;
pub mod service;
pub mod smart_mode;
pub mod storage;
pub mod timer;

pub use coordinator::{
    Clock, Heartbeat, ManualClock, OverlayHandle, OverlayPresenter, OverlayRequest,
    ReminderCoordinator, RuntimeState, SystemClock,
};
pub use display::{DisplaySnapshot, HomeDisplayModel, MenuBarDisplayState, ReminderDisplayMapper};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use reminder::{ReminderEvent, ReminderOutcome, ReminderType, RuleConfig, RuleEngine};
pub use service::{ReminderHandle, ReminderService, ServiceStatus};
pub use smart_mode::SmartModeMonitor;
pub use storage::{
    AppSettings, DailyStats, FileSettings, RecordStore, ReminderRecord, SettingsProvider,
    SettingsResetPolicy, SharedSettings,
};
pub use timer::{TimerConfig, TimerEngine};
