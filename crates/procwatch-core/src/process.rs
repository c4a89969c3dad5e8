use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sysinfo::System;

/// A running process as seen in one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub started_at: DateTime<Utc>,
}

/// Source of running-process snapshots
#[async_trait]
pub trait ProcessSource: Send + Sync {
    /// Enumerate the processes running right now
    async fn snapshot(&mut self) -> Result<Vec<ProcessInfo>>;
}

/// Process enumeration backed by `sysinfo`
pub struct SysinfoProcessSource {
    system: System,
}

impl SysinfoProcessSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSource for SysinfoProcessSource {
    async fn snapshot(&mut self) -> Result<Vec<ProcessInfo>> {
        self.system.refresh_processes();

        let processes = self
            .system
            .processes()
            .values()
            .filter_map(|process| {
                let started = i64::try_from(process.start_time()).ok()?;
                Some(ProcessInfo {
                    pid: process.pid().as_u32(),
                    name: process.name().to_string(),
                    started_at: DateTime::from_timestamp(started, 0)?,
                })
            })
            .collect();

        Ok(processes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_contains_current_process() {
        let mut source = SysinfoProcessSource::new();
        let snapshot = source.snapshot().await.unwrap();

        let own_pid = std::process::id();
        let me = snapshot.iter().find(|p| p.pid == own_pid);
        assert!(me.is_some());
        assert!(me.unwrap().started_at <= Utc::now() + chrono::Duration::seconds(5));
    }
}
