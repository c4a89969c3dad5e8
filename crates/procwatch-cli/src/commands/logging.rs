//! Logger setup for the CLI and the monitor process

use anyhow::{Context, Result};
use procwatch_core::config::LoggingSection;
use std::fs::{create_dir_all, OpenOptions};

/// Initialise `env_logger`.
///
/// `RUST_LOG` overrides the configured level. When `to_file` is set and a log
/// file is configured, output is appended to that file instead of stderr.
pub fn init_logging(logging: &LoggingSection, to_file: bool) -> Result<()> {
    build_logger(logging, to_file)?.init();
    Ok(())
}

fn build_logger(logging: &LoggingSection, to_file: bool) -> Result<env_logger::Builder> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(logging.level.as_str()),
    );
    builder.format_timestamp_secs();

    if let Some(log_path) = logging.file.as_ref().filter(|_| to_file) {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_and_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("monitor").join("procwatch.log");
        let logging = LoggingSection {
            file: Some(log_path.clone()),
            level: String::from("debug"),
        };

        build_logger(&logging, true).unwrap();

        assert!(log_path.is_file());
    }

    #[test]
    fn test_existing_log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("procwatch.log");
        std::fs::write(&log_path, "earlier run\n").unwrap();
        let logging = LoggingSection {
            file: Some(log_path.clone()),
            level: String::from("info"),
        };

        build_logger(&logging, true).unwrap();

        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "earlier run\n");
    }

    #[test]
    fn test_log_file_ignored_outside_run() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("procwatch.log");
        let logging = LoggingSection {
            file: Some(log_path),
            level: String::from("info"),
        };

        build_logger(&logging, false).unwrap();

        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn test_unwritable_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "").unwrap();
        let logging = LoggingSection {
            file: Some(blocker.join("procwatch.log")),
            level: String::from("info"),
        };

        assert!(build_logger(&logging, true).is_err());
    }
}
