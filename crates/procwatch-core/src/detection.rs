use chrono::Utc;
use std::time::Duration;

use crate::controller::{PromptController, TickOutcome};
use crate::error::MonitorError;
use crate::process::ProcessSource;
use crate::shutdown::{ShutdownReason, ShutdownSignal};

/// Take one snapshot and hand it to the controller
///
/// # Errors
///
/// Returns an error if enumeration fails or the controller cannot recover the tick
pub async fn detection_tick(
    source: &mut dyn ProcessSource,
    controller: &mut PromptController,
) -> Result<TickOutcome, MonitorError> {
    let processes = source
        .snapshot()
        .await
        .map_err(MonitorError::ProcessEnumeration)?;
    controller.handle(&processes, Utc::now()).await
}

/// Periodic detection until shutdown.
///
/// An error escaping a tick is fatal: it is logged and shutdown is requested
/// for every loop.
pub async fn run_detection_loop(
    mut source: Box<dyn ProcessSource>,
    mut controller: PromptController,
    shutdown: ShutdownSignal,
    period: Duration,
) {
    log::info!("Detection loop started (period: {}s)", period.as_secs_f32());

    while !shutdown.is_triggered() {
        match detection_tick(source.as_mut(), &mut controller).await {
            Ok(outcome) => log::trace!("Detection tick: {outcome:?}"),
            Err(e) => {
                log::error!("Unhandled error in detection loop: {e}");
                shutdown.trigger(ShutdownReason::Fatal(e.to_string()));
                break;
            }
        }

        if shutdown.is_triggered() {
            break;
        }
        tokio::time::sleep(period).await;
    }

    log::info!("Detection loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{process, RecordingHooks, ScriptedDialog};
    use crate::dialog::PromptChoice;
    use crate::process::ProcessInfo;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedSource {
        processes: Vec<ProcessInfo>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProcessSource for FixedSource {
        async fn snapshot(&mut self) -> Result<Vec<ProcessInfo>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.processes.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ProcessSource for BrokenSource {
        async fn snapshot(&mut self) -> Result<Vec<ProcessInfo>> {
            anyhow::bail!("access denied")
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_loop_after_one_tick() {
        let (hooks, log) = RecordingHooks::new("app.exe");
        let shutdown = ShutdownSignal::new();
        let controller = PromptController::new(
            Box::new(hooks),
            Box::new(ScriptedDialog::answering(&[PromptChoice::Cancel])),
            shutdown.clone(),
            "Watcher",
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FixedSource {
            processes: vec![process(1, "other.exe")],
            calls: calls.clone(),
        };

        run_detection_loop(
            Box::new(source),
            controller,
            shutdown.clone(),
            Duration::from_millis(5),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(log.lock().unwrap().cancel, 1);
        assert_eq!(shutdown.reason(), Some(ShutdownReason::UserCancelled));
    }

    #[tokio::test]
    async fn test_enumeration_error_is_fatal() {
        let (hooks, _) = RecordingHooks::new("app.exe");
        let shutdown = ShutdownSignal::new();
        let controller = PromptController::new(
            Box::new(hooks),
            Box::new(ScriptedDialog::default()),
            shutdown.clone(),
            "Watcher",
        );

        run_detection_loop(
            Box::new(BrokenSource),
            controller,
            shutdown.clone(),
            Duration::from_millis(5),
        )
        .await;

        match shutdown.reason() {
            Some(ShutdownReason::Fatal(msg)) => assert!(msg.contains("access denied")),
            other => panic!("unexpected shutdown reason: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multiple_matches_stop_loop_by_default() {
        let (hooks, log) = RecordingHooks::new("app.exe");
        let shutdown = ShutdownSignal::new();
        let controller = PromptController::new(
            Box::new(hooks),
            Box::new(ScriptedDialog::default()),
            shutdown.clone(),
            "Watcher",
        );
        let source = FixedSource {
            processes: vec![process(1, "app.exe"), process(2, "app.exe")],
            calls: Arc::new(AtomicUsize::new(0)),
        };

        run_detection_loop(
            Box::new(source),
            controller,
            shutdown.clone(),
            Duration::from_millis(5),
        )
        .await;

        assert!(matches!(shutdown.reason(), Some(ShutdownReason::Fatal(_))));
        assert!(log.lock().unwrap().single_found.is_empty());
    }

    #[tokio::test]
    async fn test_no_ticks_once_shutdown_is_set() {
        let (hooks, log) = RecordingHooks::new("app.exe");
        let shutdown = ShutdownSignal::new();
        shutdown.trigger(ShutdownReason::Interrupted);
        let controller = PromptController::new(
            Box::new(hooks),
            Box::new(ScriptedDialog::default()),
            shutdown.clone(),
            "Watcher",
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FixedSource {
            processes: vec![process(1, "app.exe")],
            calls: calls.clone(),
        };

        run_detection_loop(Box::new(source), controller, shutdown, Duration::from_millis(5)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(log.lock().unwrap().single_found.is_empty());
    }
}
