//! Monitor that records how long the watched process runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use procwatch_storage::UsageLedger;
use std::process::Command;

use crate::config::{MonitorConfig, MultiplePolicy};
use crate::controller::{MonitorHooks, MultipleResolution, Recording};
use crate::error::MonitorError;
use crate::process::ProcessInfo;

/// Render a duration as hours with two decimals
#[must_use]
pub fn format_hours(duration: chrono::Duration) -> String {
    #[allow(clippy::cast_precision_loss)]
    let hours = duration.num_seconds() as f64 / 3600.0;
    format!("{hours:.2}")
}

/// Watches one executable and feeds the usage ledger while it runs
pub struct UsageMonitor {
    ledger: UsageLedger,
    process_name: String,
    open_url: Option<String>,
    handling_period_secs: u64,
    multiple_policy: MultiplePolicy,
}

impl UsageMonitor {
    #[must_use]
    pub fn new(ledger: UsageLedger, config: &MonitorConfig) -> Self {
        Self {
            ledger,
            process_name: config.monitor.process_name.clone(),
            open_url: config.monitor.open_url.clone(),
            handling_period_secs: config.monitor.handling_period_secs,
            multiple_policy: config.monitor.multiple_policy,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Usage today and this month, in hours
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read
    pub fn usage_summary(&self, today: NaiveDate) -> Result<String> {
        let day = self.ledger.usage_for_day(today)?;
        let month = self.ledger.usage_for_month(today)?;
        Ok(format!(
            "Your {} usage today is {} hours\nYour {} usage this month is {} hours",
            self.process_name,
            format_hours(day),
            self.process_name,
            format_hours(month)
        ))
    }

    fn record(&self, started: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        let (start, end) = (started.with_timezone(&Local), now.with_timezone(&Local));
        self.ledger.update(&start, &end)?;

        match self.usage_summary(end.date_naive()) {
            Ok(summary) => log::info!("After update:\n{summary}"),
            Err(e) => log::warn!("Failed to read usage after update: {e:#}"),
        }
        Ok(())
    }
}

impl MonitorHooks for UsageMonitor {
    fn is_sought_process(&self, process: &ProcessInfo) -> bool {
        process.name == self.process_name
    }

    fn not_found_prompt_text(&self) -> String {
        let yes = self.open_url.as_deref().map_or_else(
            || String::from("acknowledge and check again later"),
            |url| format!("will open {url} in the browser"),
        );
        let usage = self
            .usage_summary(Local::now().date_naive())
            .unwrap_or_else(|e| format!("Usage unavailable: {e:#}"));

        format!(
            "Open {}?\n 'Yes' - {yes}.\n 'No' - will make the prompt appear again in {} seconds.\n 'Cancel' - will terminate the monitor.\n\n{usage}",
            self.process_name, self.handling_period_secs
        )
    }

    fn on_single_found(
        &mut self,
        process: &ProcessInfo,
        now: DateTime<Utc>,
    ) -> Result<Recording, MonitorError> {
        if now <= process.started_at {
            log::debug!("Process {} started just now, nothing to record", process.pid);
            return Ok(Recording::Skipped);
        }
        self.record(process.started_at, now)
            .map_err(MonitorError::Persistence)?;
        Ok(Recording::Written)
    }

    fn on_yes(&mut self) -> Result<(), MonitorError> {
        match &self.open_url {
            Some(url) => open_url(url).map_err(MonitorError::Hook),
            None => {
                log::info!("No URL configured, nothing to open");
                Ok(())
            }
        }
    }

    fn on_no(&mut self) {
        log::warn!("Ignoring for {} seconds.", self.handling_period_secs);
    }

    fn on_cancel(&mut self) {
        log::info!("Prompt cancelled, stopping monitor");
    }

    fn on_multiple_found(&mut self, _found: &[&ProcessInfo]) -> MultipleResolution {
        self.multiple_policy.into()
    }
}

/// Open `url` with the platform's default handler and wait for the opener to exit
fn open_url(url: &str) -> Result<()> {
    run_opener(opener_command(url), url)
}

fn opener_command(url: &str) -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    }

    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url);
        command
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

/// Run the opener to completion so the child is always reaped
fn run_opener(mut command: Command, url: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("Failed to launch opener for {url}"))?;

    if !output.status.success() {
        anyhow::bail!(
            "Opener for {url} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    log::info!("Opened {url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn monitor() -> UsageMonitor {
        let mut config = MonitorConfig::default();
        config.monitor.process_name = String::from("client.exe");
        config.monitor.multiple_policy = MultiplePolicy::Ignore;
        UsageMonitor::new(UsageLedger::open_in_memory().unwrap(), &config)
    }

    fn running(started_at: DateTime<Utc>) -> ProcessInfo {
        ProcessInfo {
            pid: 99,
            name: String::from("client.exe"),
            started_at,
        }
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(Duration::zero()), "0.00");
        assert_eq!(format_hours(Duration::minutes(90)), "1.50");
        assert_eq!(format_hours(Duration::seconds(86_460)), "24.02");
    }

    #[test]
    fn test_matches_by_exact_name() {
        let monitor = monitor();
        let now = Utc::now();
        assert!(monitor.is_sought_process(&running(now)));
        assert!(!monitor.is_sought_process(&ProcessInfo {
            pid: 1,
            name: String::from("client.exe.bak"),
            started_at: now,
        }));
    }

    #[test]
    fn test_single_found_records_usage_in_local_days() {
        let mut monitor = monitor();
        let started = Local
            .with_ymd_and_hms(2022, 3, 3, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let now = started + Duration::minutes(30);

        assert_eq!(
            monitor.on_single_found(&running(started), now).unwrap(),
            Recording::Written
        );

        let day = NaiveDate::from_ymd_opt(2022, 3, 3).unwrap();
        assert_eq!(monitor.ledger().usage_for_day(day).unwrap(), Duration::minutes(30));
        assert_eq!(
            monitor.usage_summary(day).unwrap(),
            "Your client.exe usage today is 0.50 hours\nYour client.exe usage this month is 0.50 hours"
        );
    }

    #[test]
    fn test_single_found_ignores_process_started_now() {
        let mut monitor = monitor();
        let now = Utc::now();

        assert_eq!(
            monitor.on_single_found(&running(now), now).unwrap(),
            Recording::Skipped
        );

        assert_eq!(
            monitor.ledger().usage_for_day(now.with_timezone(&Local).date_naive()).unwrap(),
            Duration::zero()
        );
    }

    #[test]
    fn test_prompt_text_mentions_choices_and_usage() {
        let monitor = monitor();
        let text = monitor.not_found_prompt_text();

        assert!(text.starts_with("Open client.exe?"));
        assert!(text.contains("again in 5 seconds"));
        assert!(text.contains("usage today is 0.00 hours"));
    }

    #[test]
    fn test_yes_without_url_is_ok() {
        let mut monitor = monitor();
        assert!(monitor.on_yes().is_ok());
    }

    #[test]
    fn test_multiple_policy_from_config() {
        let mut monitor = monitor();
        assert_eq!(monitor.on_multiple_found(&[]), MultipleResolution::Ignore);
    }

    /// PIDs of zombie children of this test process
    #[cfg(target_os = "linux")]
    fn zombie_children() -> Vec<u32> {
        let mut zombies = Vec::new();
        let Ok(tasks) = std::fs::read_dir("/proc/self/task") else {
            return zombies;
        };
        for task in tasks.flatten() {
            let children = std::fs::read_to_string(task.path().join("children")).unwrap_or_default();
            for pid in children.split_whitespace().filter_map(|p| p.parse::<u32>().ok()) {
                let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).unwrap_or_default();
                // State follows the parenthesised command name
                let state = stat.rsplit(')').next().and_then(|rest| rest.split_whitespace().next());
                if state == Some("Z") {
                    zombies.push(pid);
                }
            }
        }
        zombies
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_opener_is_reaped_after_each_run() {
        for _ in 0..3 {
            let mut command = Command::new("sh");
            command.args(["-c", "exit 0"]);
            run_opener(command, "https://example.com").unwrap();
        }

        // A child of a concurrently running test may be caught between exit
        // and wait; only zombies that outlive a second scan count
        let first = zombie_children();
        std::thread::sleep(std::time::Duration::from_millis(200));
        let lingering: Vec<u32> = zombie_children()
            .into_iter()
            .filter(|pid| first.contains(pid))
            .collect();
        assert!(lingering.is_empty(), "zombie children: {lingering:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_opener_failure_is_reported() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo no handler >&2; exit 3"]);

        let err = run_opener(command, "https://example.com").unwrap_err();

        let msg = format!("{err:#}");
        assert!(msg.contains("https://example.com"));
        assert!(msg.contains("no handler"));
    }

    #[test]
    fn test_missing_opener_is_an_error() {
        let command = Command::new("procwatch-no-such-opener");
        assert!(run_opener(command, "https://example.com").is_err());
    }
}
