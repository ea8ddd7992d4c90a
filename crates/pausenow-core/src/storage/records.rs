//! SQLite-based reminder history.
//!
//! Every resolved reminder is stored as one row: its type, whether the user
//! completed or skipped it, and when. Daily statistics are derived from it.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::reminder::{ReminderOutcome, ReminderType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub id: i64,
    pub reminder_type: ReminderType,
    pub outcome: ReminderOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DailyStats {
    pub completed_count: u64,
    pub skipped_count: u64,
}

/// SQLite store for resolved reminders.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open the database at `~/.config/pausenow/pausenow.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pausenow.db"))
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reminder_records (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                reminder_type TEXT NOT NULL,
                outcome       TEXT NOT NULL,
                recorded_at   TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reminder_records_recorded_at ON reminder_records(recorded_at);",
        )
    }

    /// # Errors
    /// Returns an error if the insert fails.
    pub fn append(
        &self,
        reminder_type: ReminderType,
        outcome: ReminderOutcome,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO reminder_records (reminder_type, outcome, recorded_at)
             VALUES (?1, ?2, ?3)",
            params![reminder_type.as_str(), outcome.as_str(), timestamp_key(at)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Counts for the UTC calendar day containing `now`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn today_stats(&self, now: DateTime<Utc>) -> Result<DailyStats> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(now);
        let day_end = day_start + Duration::days(1);

        let mut stmt = self.conn.prepare(
            "SELECT outcome, COUNT(*)
             FROM reminder_records
             WHERE recorded_at >= ?1 AND recorded_at < ?2
             GROUP BY outcome",
        )?;
        let rows = stmt.query_map(
            params![timestamp_key(day_start), timestamp_key(day_end)],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)),
        )?;

        let mut stats = DailyStats::default();
        for row in rows {
            let (outcome, count) = row?;
            match outcome.as_str() {
                "completed" => stats.completed_count += count,
                "skipped" => stats.skipped_count += count,
                _ => {}
            }
        }
        Ok(stats)
    }

    /// Most recent records first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn recent(&self, limit: usize) -> Result<Vec<ReminderRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, reminder_type, outcome, recorded_at
             FROM reminder_records
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, reminder_type, outcome, recorded_at) = row?;
            let reminder_type = match reminder_type.as_str() {
                "standup" => ReminderType::Standup,
                _ => ReminderType::EyeBreak,
            };
            let outcome = match outcome.as_str() {
                "skipped" => ReminderOutcome::Skipped,
                _ => ReminderOutcome::Completed,
            };
            let timestamp = DateTime::parse_from_rfc3339(&recorded_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            records.push(ReminderRecord {
                id,
                reminder_type,
                outcome,
                timestamp,
            });
        }
        Ok(records)
    }
}

/// Fixed-width RFC 3339 so text comparison matches time order.
fn timestamp_key(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
