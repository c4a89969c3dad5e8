//! Usage ledger: presence intervals bucketed by calendar day.
//!
//! The ledger is written from a single task. It owns its connection, so
//! sharing it between writers requires wrapping it in a mutex.

mod helpers;
mod queries;


use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::migrations;
use crate::models::PresenceInterval;

pub use helpers::start_of_day;

/// Persistent, date-bucketed accumulator of presence intervals
pub struct UsageLedger {
    conn: Connection,
    path: Option<PathBuf>,
}

impl UsageLedger {
    /// Open (or create) the ledger stored at `path`, or at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation, connection opening, or schema initialization fails
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(Self::default_ledger_path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                log::warn!(
                    "Storage directory doesn't exist, creating: {}",
                    parent.display()
                );
            }
            std::fs::create_dir_all(parent).context("Failed to create ledger directory")?;
        }

        let conn = Connection::open(&path).context("Failed to open ledger database")?;
        migrations::init_schema(&conn)?;

        log::info!("Usage ledger initialized at: {}", path.display());

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Open a ledger that lives only as long as this value
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory ledger")?;
        migrations::init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Default ledger location under the local data directory
    #[must_use]
    pub fn default_ledger_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("procwatch");
        path.push("usage.db");
        path
    }

    /// File backing this ledger, `None` when in memory
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record presence between `start` and `end`.
    ///
    /// Calendar days are taken in the time zone of `start`. The span is split
    /// into one sub-interval per day it touches and each one is persisted
    /// before the next is written. Returns the recorded sub-intervals.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is not after `start` or if a write fails
    pub fn update<Tz: TimeZone>(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<Vec<(NaiveDate, PresenceInterval)>> {
        let segments = split_by_day(start, end)?;
        for (day, interval) in &segments {
            self.record_day(*day, interval)?;
        }

        log::debug!(
            "Recorded {} sub-interval(s) for {} -> {}",
            segments.len(),
            start.with_timezone(&Utc).to_rfc3339(),
            end.with_timezone(&Utc).to_rfc3339()
        );
        Ok(segments)
    }

    /// Merge one interval into the bucket for `day`.
    ///
    /// Keyed by interval start: writing the same start twice keeps the last
    /// end. The write is a single statement and is durable on return.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails
    pub fn record_day(&self, day: NaiveDate, interval: &PresenceInterval) -> Result<()> {
        let start_ts = interval.start().timestamp();
        let end_ts = interval.end().timestamp();
        if end_ts <= start_ts {
            log::debug!("Skipping sub-second interval on {day} at {start_ts}");
            return Ok(());
        }

        self.conn
            .execute(
                "INSERT INTO presence_intervals (year, month, day, start_ts, end_ts)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(year, month, day, start_ts) DO UPDATE SET
                    end_ts = excluded.end_ts",
                params![day.year(), day.month(), day.day(), start_ts, end_ts],
            )
            .with_context(|| format!("Failed to record usage for {day}"))?;
        Ok(())
    }
}

/// Split `start..end` into per-day sub-intervals in the time zone of `start`.
///
/// Every sub-interval lies inside one calendar day and their durations sum
/// to `end - start`.
///
/// # Errors
///
/// Returns an error if `end` is not after `start` or a day boundary cannot be resolved
pub fn split_by_day<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
) -> Result<Vec<(NaiveDate, PresenceInterval)>> {
    let whole = PresenceInterval::new(start.with_timezone(&Utc), end.with_timezone(&Utc))?;

    let tz = start.timezone();
    let start_day = start.date_naive();
    let end_day = end.with_timezone(&tz).date_naive();
    let days = end_day.signed_duration_since(start_day).num_days();

    if days <= 0 {
        return Ok(vec![(start_day, whole)]);
    }

    let mut segments = Vec::new();
    let mut day = start_day;
    let mut segment_start = whole.start();
    for _ in 0..days {
        let next_day = day
            .succ_opt()
            .with_context(|| format!("Date overflow after {day}"))?;
        let next_start = start_of_day(&tz, next_day)?.with_timezone(&Utc);
        segments.push((day, PresenceInterval::new(segment_start, next_start)?));
        day = next_day;
        segment_start = next_start;
    }

    // Nothing left to record when `end` falls exactly on midnight
    if whole.end() > segment_start {
        segments.push((end_day, PresenceInterval::new(segment_start, whole.end())?));
    }

    Ok(segments)
}
