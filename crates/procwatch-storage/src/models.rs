use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A span during which the watched process was continuously running.
///
/// Half-open: `start` is included, `end` is not. Construction guarantees
/// `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl PresenceInterval {
    /// Create a new presence interval
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is not strictly after `start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<Self> {
        if end <= start {
            anyhow::bail!(
                "Presence interval must end after it starts (start: {}, end: {})",
                start.to_rfc3339(),
                end.to_rfc3339()
            );
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Total usage recorded for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayUsage {
    pub day: NaiveDate,
    pub seconds: i64,
}

impl DayUsage {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}
