//! Calendar and timestamp conversions for the ledger.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::types::Type;

/// Convert a stored Unix timestamp back to a UTC datetime, returning a rusqlite error on failure.
pub fn parse_timestamp(ts: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Integer,
            format!("timestamp out of range: {ts}").into(),
        )
    })
}

/// First instant of `date` in `tz`.
///
/// Midnight is used when it exists. When a DST transition skips midnight the
/// first whole hour of the day that does exist is used instead.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .with_context(|| format!("No valid start of day for {date}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_parse_timestamp_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(dt.timestamp()).unwrap(), dt);
    }

    #[test]
    fn test_start_of_day_in_fixed_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        let start = start_of_day(&tz, date).unwrap();

        assert_eq!(start.date_naive(), date);
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2022, 1, 1, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_skips_missing_midnight() {
        // Clocks jumped from 00:00 to 01:00 on this day
        let tz = chrono_tz::America::Sao_Paulo;
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let start = start_of_day(&tz, date).unwrap();

        assert_eq!(start.date_naive(), date);
        assert_eq!(start.naive_local(), date.and_hms_opt(1, 0, 0).unwrap());
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap()
        );
    }
}
