//! Classification of a process snapshot and dispatch to monitor hooks.

use chrono::{DateTime, Duration, Utc};

use crate::config::{MultiplePolicy, PersistencePolicy};
use crate::dialog::{Dialog, PromptChoice};
use crate::error::MonitorError;
use crate::process::ProcessInfo;
use crate::shutdown::{ShutdownReason, ShutdownSignal};

/// Minimum time between two ledger writes
pub const LEDGER_DEBOUNCE_SECS: i64 = 60;

/// How to resolve a snapshot with more than one matching process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipleResolution {
    /// Fail the tick with `MonitorError::MultipleProcessesFound`
    Abort,
    /// Continue with the first match as if it were the only one
    PickFirst,
    /// Do nothing this tick
    Ignore,
    /// The hook already dealt with the matches itself
    Handled,
}

impl From<MultiplePolicy> for MultipleResolution {
    fn from(policy: MultiplePolicy) -> Self {
        match policy {
            MultiplePolicy::Abort => Self::Abort,
            MultiplePolicy::PickFirst => Self::PickFirst,
            MultiplePolicy::Ignore => Self::Ignore,
        }
    }
}

/// Whether a single-found hook wrote to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recording {
    Written,
    /// Nothing to record yet; the debounce stays disarmed
    Skipped,
}

/// Behaviour a concrete monitor plugs into the controller
pub trait MonitorHooks: Send {
    /// Whether `process` is the one being watched
    fn is_sought_process(&self, process: &ProcessInfo) -> bool;

    /// Text shown in the prompt when the process is not running
    fn not_found_prompt_text(&self) -> String;

    /// Called when exactly one matching process is running
    ///
    /// # Errors
    ///
    /// Ledger failures must be reported as `MonitorError::Persistence`
    fn on_single_found(
        &mut self,
        process: &ProcessInfo,
        now: DateTime<Utc>,
    ) -> Result<Recording, MonitorError>;

    /// # Errors
    ///
    /// Returns an error if the hook action fails
    fn on_yes(&mut self) -> Result<(), MonitorError>;

    fn on_no(&mut self);

    /// Called before the controller requests shutdown
    fn on_cancel(&mut self);

    fn on_multiple_found(&mut self, _found: &[&ProcessInfo]) -> MultipleResolution {
        MultipleResolution::Abort
    }
}

/// Result of classifying one snapshot
#[derive(Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    NotFound,
    Single(&'a ProcessInfo),
    Multiple(Vec<&'a ProcessInfo>),
}

/// Sort a snapshot into not found / single / multiple
pub fn classify<'a>(hooks: &dyn MonitorHooks, processes: &'a [ProcessInfo]) -> Classification<'a> {
    let mut found: Vec<&ProcessInfo> = processes
        .iter()
        .filter(|p| hooks.is_sought_process(p))
        .collect();

    match found.len() {
        0 => Classification::NotFound,
        1 => Classification::Single(found.remove(0)),
        _ => Classification::Multiple(found),
    }
}

/// What a handled tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Process absent, the user answered the prompt
    Prompted(PromptChoice),
    /// Usage was written to the ledger
    Recorded,
    /// The hook had nothing to write this tick
    NothingToRecord,
    /// Within the debounce window of the last write
    Debounced,
    /// The ledger write failed and was skipped by policy
    PersistenceSkipped,
    MultipleIgnored,
    MultipleHandled,
}

/// Drives hooks from process snapshots
pub struct PromptController {
    hooks: Box<dyn MonitorHooks>,
    dialog: Box<dyn Dialog>,
    shutdown: ShutdownSignal,
    prompt_title: String,
    persistence_policy: PersistencePolicy,
    last_ledger_update: Option<DateTime<Utc>>,
}

impl PromptController {
    #[must_use]
    pub fn new(
        hooks: Box<dyn MonitorHooks>,
        dialog: Box<dyn Dialog>,
        shutdown: ShutdownSignal,
        prompt_title: impl Into<String>,
    ) -> Self {
        Self {
            hooks,
            dialog,
            shutdown,
            prompt_title: prompt_title.into(),
            persistence_policy: PersistencePolicy::default(),
            last_ledger_update: None,
        }
    }

    #[must_use]
    pub fn with_persistence_policy(mut self, policy: PersistencePolicy) -> Self {
        self.persistence_policy = policy;
        self
    }

    /// Time of the last successful ledger write
    #[must_use]
    pub fn last_ledger_update(&self) -> Option<DateTime<Utc>> {
        self.last_ledger_update
    }

    /// Classify `processes` and run the matching hook.
    ///
    /// Waits for the user while the prompt is open.
    ///
    /// # Errors
    ///
    /// Returns an error when the tick cannot be recovered: multiple matches
    /// with the abort policy, a failing prompt or hook, or a ledger failure
    /// under `PersistencePolicy::Abort`
    pub async fn handle(
        &mut self,
        processes: &[ProcessInfo],
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, MonitorError> {
        match classify(self.hooks.as_ref(), processes) {
            Classification::NotFound => {
                log::info!("Process not found");
                self.prompt().await
            }
            Classification::Single(process) => {
                log::debug!("Single process found: {process:?}");
                self.single_found(process, now)
            }
            Classification::Multiple(found) => self.multiple_found(&found, now),
        }
    }

    async fn prompt(&mut self) -> Result<TickOutcome, MonitorError> {
        let text = self.hooks.not_found_prompt_text();
        let choice = self
            .dialog
            .show_yes_no_cancel(&self.prompt_title, &text)
            .await
            .map_err(MonitorError::Dialog)?;

        match choice {
            PromptChoice::Yes => self.hooks.on_yes()?,
            PromptChoice::No => self.hooks.on_no(),
            PromptChoice::Cancel => {
                self.hooks.on_cancel();
                self.shutdown.trigger(ShutdownReason::UserCancelled);
            }
        }
        Ok(TickOutcome::Prompted(choice))
    }

    fn single_found(
        &mut self,
        process: &ProcessInfo,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, MonitorError> {
        if let Some(last) = self.last_ledger_update {
            if now - last < Duration::seconds(LEDGER_DEBOUNCE_SECS) {
                log::debug!("Last update done within last minute ({last}). Not updating.");
                return Ok(TickOutcome::Debounced);
            }
        }

        match self.hooks.on_single_found(process, now) {
            Ok(Recording::Written) => {
                self.last_ledger_update = Some(now);
                Ok(TickOutcome::Recorded)
            }
            Ok(Recording::Skipped) => Ok(TickOutcome::NothingToRecord),
            Err(e) if e.is_persistence() && self.persistence_policy == PersistencePolicy::Skip => {
                log::error!("{e}. Skipping this update, will retry on next tick.");
                Ok(TickOutcome::PersistenceSkipped)
            }
            Err(e) => Err(e),
        }
    }

    fn multiple_found(
        &mut self,
        found: &[&ProcessInfo],
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, MonitorError> {
        match self.hooks.on_multiple_found(found) {
            MultipleResolution::Abort => Err(MonitorError::MultipleProcessesFound {
                count: found.len(),
                names: found.iter().map(|p| format!("{} ({})", p.name, p.pid)).collect(),
            }),
            MultipleResolution::PickFirst => {
                log::warn!(
                    "Found {} matching processes, tracking PID {}",
                    found.len(),
                    found[0].pid
                );
                self.single_found(found[0], now)
            }
            MultipleResolution::Ignore => {
                log::warn!("Found {} matching processes, ignoring", found.len());
                Ok(TickOutcome::MultipleIgnored)
            }
            MultipleResolution::Handled => Ok(TickOutcome::MultipleHandled),
        }
    }
}
