use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::params;

use super::helpers::parse_timestamp;
use super::UsageLedger;
use crate::models::{DayUsage, PresenceInterval};

impl UsageLedger {
    /// Total usage recorded for the calendar day of `day`.
    ///
    /// A day that was never written reports zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn usage_for_day(&self, day: NaiveDate) -> Result<Duration> {
        let seconds: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(end_ts - start_ts), 0)
                 FROM presence_intervals
                 WHERE year = ?1 AND month = ?2 AND day = ?3",
                params![day.year(), day.month(), day.day()],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to read usage for {day}"))?;
        Ok(Duration::seconds(seconds))
    }

    /// Total usage recorded in the calendar month containing `day`.
    ///
    /// A month with no recorded days reports zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn usage_for_month(&self, day: NaiveDate) -> Result<Duration> {
        let seconds: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(end_ts - start_ts), 0)
                 FROM presence_intervals
                 WHERE year = ?1 AND month = ?2",
                params![day.year(), day.month()],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to read usage for {}-{:02}", day.year(), day.month()))?;
        Ok(Duration::seconds(seconds))
    }

    /// Per-day totals for the month containing `day`, ordered by day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn daily_usage_for_month(&self, day: NaiveDate) -> Result<Vec<DayUsage>> {
        let (year, month) = (day.year(), day.month());
        let mut stmt = self.conn.prepare(
            "SELECT day, SUM(end_ts - start_ts)
             FROM presence_intervals
             WHERE year = ?1 AND month = ?2
             GROUP BY day
             ORDER BY day ASC",
        )?;

        let rows = stmt
            .query_map(params![year, month], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(d, seconds)| {
                let day = NaiveDate::from_ymd_opt(year, month, d)
                    .with_context(|| format!("Invalid day {year}-{month:02}-{d:02} in ledger"))?;
                Ok(DayUsage { day, seconds })
            })
            .collect()
    }

    /// Intervals recorded under `day`, ordered by start
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored row is malformed
    pub fn intervals_for_day(&self, day: NaiveDate) -> Result<Vec<PresenceInterval>> {
        let mut stmt = self.conn.prepare(
            "SELECT start_ts, end_ts
             FROM presence_intervals
             WHERE year = ?1 AND month = ?2 AND day = ?3
             ORDER BY start_ts ASC",
        )?;

        let rows = stmt
            .query_map(params![day.year(), day.month(), day.day()], |row| {
                Ok((
                    parse_timestamp(row.get(0)?)?,
                    parse_timestamp(row.get(1)?)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(start, end)| PresenceInterval::new(start, end))
            .collect()
    }
}
