use chrono::{Duration, Utc};
use clap::{Args, ValueEnum};
use pausenow_core::{AppSettings, ReminderDisplayMapper, RuntimeState};

#[derive(Clone, Copy, ValueEnum)]
pub enum PreviewState {
    Stopped,
    Running,
    Paused,
}

impl From<PreviewState> for RuntimeState {
    fn from(state: PreviewState) -> Self {
        match state {
            PreviewState::Stopped => RuntimeState::Stopped,
            PreviewState::Running => RuntimeState::Running,
            PreviewState::Paused => RuntimeState::Paused,
        }
    }
}

#[derive(Args)]
pub struct PreviewArgs {
    #[arg(long, value_enum, default_value = "stopped")]
    state: PreviewState,
    /// Seconds left on the countdown (running/paused)
    #[arg(long)]
    remaining: Option<i64>,
}

pub fn run(args: PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = AppSettings::load_or_default();
    let now = Utc::now();
    let remaining = args.remaining.map(Duration::seconds);

    let snapshot = ReminderDisplayMapper::build(
        args.state.into(),
        remaining.map(|r| now + r),
        remaining,
        &settings,
        now,
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
