use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Why the monitor is stopping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The user answered "Cancel" on the prompt
    UserCancelled,
    /// Ctrl-C or another external request
    Interrupted,
    /// A detection tick failed and could not be recovered
    Fatal(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserCancelled => write!(f, "cancelled by user"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Fatal(msg) => write!(f, "fatal error: {msg}"),
        }
    }
}

/// Cooperative termination flag shared by every loop.
///
/// Once triggered it stays triggered. The first reason given wins.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    reason: Arc<OnceLock<ShutdownReason>>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self, reason: ShutdownReason) {
        if self.reason.set(reason.clone()).is_ok() {
            log::warn!("Shutting down: {reason}");
        }
        self.triggered.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_starts_clear() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
        assert_eq!(signal.reason(), None);
    }

    #[test]
    fn test_trigger_is_visible_through_clones() {
        let signal = ShutdownSignal::new();
        let other = signal.clone();

        other.trigger(ShutdownReason::UserCancelled);

        assert!(signal.is_triggered());
        assert_eq!(signal.reason(), Some(ShutdownReason::UserCancelled));
    }

    #[test]
    fn test_first_reason_wins() {
        let signal = ShutdownSignal::new();
        signal.trigger(ShutdownReason::Fatal(String::from("boom")));
        signal.trigger(ShutdownReason::Interrupted);

        assert_eq!(
            signal.reason(),
            Some(ShutdownReason::Fatal(String::from("boom")))
        );
    }

    #[test]
    fn test_trigger_visible_across_threads() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        std::thread::spawn(move || remote.trigger(ShutdownReason::Interrupted))
            .join()
            .unwrap();
        assert!(signal.is_triggered());
    }
}
