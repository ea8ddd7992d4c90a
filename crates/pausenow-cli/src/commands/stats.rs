use chrono::Utc;
use clap::Subcommand;
use pausenow_core::RecordStore;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completed and skipped reminders
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Most recent reminder records
    Recent {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::open()?;

    match action {
        StatsAction::Today { json } => {
            let stats = store.today_stats(Utc::now())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("completed: {}", stats.completed_count);
                println!("skipped:   {}", stats.skipped_count);
            }
        }
        StatsAction::Recent { limit } => {
            let records = store.recent(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
