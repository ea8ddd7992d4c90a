use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Args;
use pausenow_core::{
    AppSettings, Event, FileSettings, OverlayHandle, OverlayPresenter, OverlayRequest,
    RecordStore, ReminderHandle, ReminderService, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinError;
use tracing::{info, warn};

const SETTINGS_POLL: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct RunArgs {
    /// Do not start the countdown until toggled
    #[arg(long)]
    paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdinCommand {
    Toggle,
    BreakNow,
    Skip,
    Reset,
    Fullscreen(bool),
    Status,
    Quit,
}

fn parse_command(line: &str) -> Option<StdinCommand> {
    match line.trim() {
        "t" => Some(StdinCommand::Toggle),
        "b" => Some(StdinCommand::BreakNow),
        "s" => Some(StdinCommand::Skip),
        "r" => Some(StdinCommand::Reset),
        "f" => Some(StdinCommand::Fullscreen(true)),
        "F" => Some(StdinCommand::Fullscreen(false)),
        "?" | "status" => Some(StdinCommand::Status),
        "q" | "quit" => Some(StdinCommand::Quit),
        _ => None,
    }
}

type ActiveOverlay = Arc<Mutex<Option<OverlayHandle>>>;

/// Prints the prompt and completes the break once its duration elapses.
/// The active handle is shared with the stdin loop so `s` can skip it.
struct TerminalOverlay {
    active: ActiveOverlay,
}

impl OverlayPresenter for TerminalOverlay {
    fn present(&mut self, request: OverlayRequest, handle: OverlayHandle) {
        println!();
        println!("=== {} ({}s) ===", request.reminder_type, request.duration_secs);
        println!("{}", request.prompt);
        println!("(press s to skip)");

        let presentation_id = handle.presentation_id();
        if let Ok(mut active) = self.active.lock() {
            *active = Some(handle);
        }

        let active = self.active.clone();
        let duration = Duration::from_secs(u64::from(request.duration_secs));
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let handle = match active.lock() {
                Ok(mut guard) => match guard.as_ref() {
                    Some(h) if h.presentation_id() == presentation_id => guard.take(),
                    _ => None,
                },
                Err(_) => None,
            };
            if let Some(handle) = handle {
                handle.complete();
            }
        });
    }
}

fn take_active(active: &ActiveOverlay) -> Option<OverlayHandle> {
    active.lock().ok().and_then(|mut guard| guard.take())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_async(args))
}

async fn run_async(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Writes the default file on first run so FileSettings has something to read.
    let initial = AppSettings::load()?;
    let config_path = AppSettings::path()?;
    let records = RecordStore::open()?;

    let active: ActiveOverlay = Arc::new(Mutex::new(None));
    let (handle, task) = ReminderService::spawn(
        Arc::new(FileSettings::new(config_path.clone())),
        Box::new(TerminalOverlay {
            active: active.clone(),
        }),
        Arc::new(SystemClock),
        Some(records),
    );

    let printer = tokio::spawn(print_events(handle.clone()));
    let watcher = tokio::spawn(watch_settings(handle.clone(), config_path, initial));

    if !args.paused {
        handle.start().await?;
    }
    println!("commands: t toggle, b break, s skip, r reset, f/F fullscreen on/off, q quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = parse_command(&line) else {
                    if !line.trim().is_empty() {
                        println!("unknown command: {}", line.trim());
                    }
                    continue;
                };
                match command {
                    StdinCommand::Toggle => handle.toggle().await?,
                    StdinCommand::BreakNow => handle.manual_break().await?,
                    StdinCommand::Skip => match take_active(&active) {
                        Some(overlay) => overlay.skip(),
                        None => println!("no break in progress"),
                    },
                    StdinCommand::Reset => handle.reset().await?,
                    StdinCommand::Fullscreen(enabled) => handle.set_fullscreen(enabled).await?,
                    StdinCommand::Status => {
                        let status = handle.status().await?;
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    }
                    StdinCommand::Quit => break,
                }
            }
        }
    }

    // A break still on screen counts as skipped.
    drop(take_active(&active));
    watcher.abort();
    handle.shutdown().await?;
    service_exited_cleanly(task.await);
    printer.abort();
    Ok(())
}

fn service_exited_cleanly(result: Result<(), JoinError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "run: reminder service task failed");
            false
        }
    }
}

async fn print_events(handle: ReminderHandle) {
    let mut events = handle.subscribe();
    loop {
        match events.recv().await {
            Ok(event) => println!("{}", describe(&event)),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "run: event printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn describe(event: &Event) -> String {
    let at = event.at().with_timezone(&chrono::Local).format("%H:%M:%S");
    match event {
        Event::ReminderStarted { due_at, .. } => format!(
            "[{at}] started, next break at {}",
            due_at.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        Event::ReminderPaused { remaining_secs, .. } => {
            format!("[{at}] paused, {remaining_secs}s left")
        }
        Event::ReminderResumed { .. } => format!("[{at}] resumed"),
        Event::ReminderPresented {
            reminder_type,
            manual,
            ..
        } => {
            let source = if *manual { "manual" } else { "scheduled" };
            format!("[{at}] {reminder_type} ({source})")
        }
        Event::ReminderCompleted { reminder_type, .. } => {
            format!("[{at}] {reminder_type} completed")
        }
        Event::ReminderSkipped { reminder_type, .. } => format!("[{at}] {reminder_type} skipped"),
        Event::ScheduleReset { .. } => format!("[{at}] schedule reset"),
    }
}

/// Polls `config.toml` and forwards edits so interval changes reset the schedule.
async fn watch_settings(handle: ReminderHandle, path: std::path::PathBuf, mut last: AppSettings) {
    let mut interval = tokio::time::interval(SETTINGS_POLL);
    interval.tick().await;
    loop {
        interval.tick().await;
        let current = match AppSettings::load_from(&path) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                warn!(error = %e, "run: failed to reload settings");
                continue;
            }
        };
        if current == last {
            continue;
        }
        info!("run: settings changed on disk");
        let old = std::mem::replace(&mut last, current.clone());
        if handle.settings_changed(old, current).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pausenow_core::ReminderType;

    #[test]
    fn parses_single_letter_commands() {
        assert_eq!(parse_command("t"), Some(StdinCommand::Toggle));
        assert_eq!(parse_command("b\n"), Some(StdinCommand::BreakNow));
        assert_eq!(parse_command(" s "), Some(StdinCommand::Skip));
        assert_eq!(parse_command("r"), Some(StdinCommand::Reset));
        assert_eq!(parse_command("q"), Some(StdinCommand::Quit));
    }

    #[test]
    fn fullscreen_case_selects_state() {
        assert_eq!(parse_command("f"), Some(StdinCommand::Fullscreen(true)));
        assert_eq!(parse_command("F"), Some(StdinCommand::Fullscreen(false)));
    }

    #[test]
    fn unknown_input_is_ignored() {
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command(""), None);
    }

    #[tokio::test]
    async fn panicked_service_task_is_reported() {
        let task = tokio::spawn(async { panic!("service crashed") });
        assert!(!service_exited_cleanly(task.await));

        let task = tokio::spawn(async {});
        assert!(service_exited_cleanly(task.await));
    }

    #[test]
    fn describes_presented_reminders() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let line = describe(&Event::ReminderPresented {
            reminder_type: ReminderType::Standup,
            duration_secs: 180,
            manual: true,
            at,
        });
        assert!(line.contains("standup"));
        assert!(line.contains("manual"));
    }
}
