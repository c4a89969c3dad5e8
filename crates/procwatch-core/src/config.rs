use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the local data directory for procwatch.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("procwatch");
    Ok(path)
}

/// Default configuration file location.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("config.toml"))
}

/// What to do when more than one process matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplePolicy {
    /// Stop the monitor
    #[default]
    Abort,
    /// Track the first match as if it were the only one
    PickFirst,
    /// Log and wait for the next tick
    Ignore,
}

/// What to do when the usage ledger cannot be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Log the failure and retry on the next tick
    #[default]
    Skip,
    /// Stop the monitor
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Executable name of the watched process
    pub process_name: String,
    pub handling_period_secs: u64,
    pub reposition_period_secs: u64,
    /// Title of the decision prompt, also used to find its window
    pub prompt_window_title: String,
    /// Opened when the user answers "Yes"
    pub open_url: Option<String>,
    pub multiple_policy: MultiplePolicy,
    pub persistence_policy: PersistencePolicy,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            process_name: String::from("wfica32.exe"),
            handling_period_secs: 5,
            reposition_period_secs: 5,
            prompt_window_title: String::from("procwatch"),
            open_url: None,
            multiple_policy: MultiplePolicy::default(),
            persistence_policy: PersistencePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageSection {
    /// Ledger file; the default data directory is used when unset
    pub store_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log file; logs go to stderr when unset
    pub file: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            file: None,
            level: String::from("info"),
        }
    }
}

/// Monitor configuration, read from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub monitor: MonitorSection,
    pub usage: UsageSection,
    pub logging: LoggingSection,
}

impl MonitorConfig {
    /// Parse a configuration document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has invalid values
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path()?, false),
        };

        if !explicit && !path.exists() {
            log::debug!(
                "No configuration at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Render as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    fn validate(&self) -> Result<()> {
        if self.monitor.process_name.trim().is_empty() {
            anyhow::bail!("monitor.process_name must not be empty");
        }
        if self.monitor.handling_period_secs == 0 || self.monitor.reposition_period_secs == 0 {
            anyhow::bail!("monitor periods must be at least one second");
        }
        Ok(())
    }

    #[must_use]
    pub fn handling_period(&self) -> Duration {
        Duration::from_secs(self.monitor.handling_period_secs)
    }

    #[must_use]
    pub fn reposition_period(&self) -> Duration {
        Duration::from_secs(self.monitor.reposition_period_secs)
    }
}
