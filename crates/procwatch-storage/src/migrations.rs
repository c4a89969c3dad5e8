use anyhow::Result;
use rusqlite::Connection;

/// Initialize ledger schema
///
/// # Errors
///
/// Returns an error if pragma setup, table creation or index creation fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Every committed write must reach disk before the call returns
    conn.execute_batch("PRAGMA synchronous = FULL;")?;

    // Presence intervals - one row per (calendar day, interval start)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS presence_intervals (
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            day INTEGER NOT NULL,
            start_ts INTEGER NOT NULL,
            end_ts INTEGER NOT NULL,
            PRIMARY KEY (year, month, day, start_ts)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_presence_intervals_month
         ON presence_intervals(year, month)",
        [],
    )?;

    Ok(())
}
