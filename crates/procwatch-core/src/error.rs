use thiserror::Error;

/// Failures raised while handling a detection tick
#[derive(Debug, Error)]
pub enum MonitorError {
    /// More matches than the single-process assumption allows
    #[error("Found {count} processes: {names:?}")]
    MultipleProcessesFound { count: usize, names: Vec<String> },

    /// The usage ledger could not be written
    #[error("Failed to persist usage: {0:#}")]
    Persistence(#[source] anyhow::Error),

    #[error("Failed to enumerate processes: {0:#}")]
    ProcessEnumeration(#[source] anyhow::Error),

    #[error("Prompt failed: {0:#}")]
    Dialog(#[source] anyhow::Error),

    /// A monitor hook failed for a reason other than persistence
    #[error("Monitor hook failed: {0:#}")]
    Hook(#[source] anyhow::Error),
}

impl MonitorError {
    /// Whether the error came from the ledger
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
