use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

use crate::config::MonitorConfig;
use crate::controller::PromptController;
use crate::detection::run_detection_loop;
use crate::process::ProcessSource;
use crate::reposition::run_reposition_loop;
use crate::shutdown::{ShutdownReason, ShutdownSignal};
use crate::window::WindowSystem;

/// Runs the detection and reposition loops side by side until shutdown
pub struct Scheduler {
    shutdown: ShutdownSignal,
    handling_period: Duration,
    reposition_period: Duration,
    prompt_title: String,
    handle_ctrl_c: bool,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        shutdown: ShutdownSignal,
        handling_period: Duration,
        reposition_period: Duration,
        prompt_title: impl Into<String>,
    ) -> Self {
        Self {
            shutdown,
            handling_period,
            reposition_period,
            prompt_title: prompt_title.into(),
            handle_ctrl_c: true,
        }
    }

    #[must_use]
    pub fn from_config(config: &MonitorConfig, shutdown: ShutdownSignal) -> Self {
        Self::new(
            shutdown,
            config.handling_period(),
            config.reposition_period(),
            config.monitor.prompt_window_title.clone(),
        )
    }

    /// Do not install a Ctrl-C listener
    #[must_use]
    pub fn without_ctrl_c(mut self) -> Self {
        self.handle_ctrl_c = false;
        self
    }

    /// Start both loops and wait until both have stopped.
    ///
    /// If either loop panics the other is asked to stop as well.
    ///
    /// # Errors
    ///
    /// Returns an error if a loop task panicked
    pub async fn run(
        self,
        source: Box<dyn ProcessSource>,
        controller: PromptController,
        windows: Box<dyn WindowSystem>,
    ) -> Result<ShutdownReason> {
        log::warn!(
            "Monitor started. Shutdown takes up to {} seconds once requested.",
            self.handling_period.max(self.reposition_period).as_secs()
        );

        let mut detection = tokio::spawn(run_detection_loop(
            source,
            controller,
            self.shutdown.clone(),
            self.handling_period,
        ));
        let mut reposition = tokio::spawn(run_reposition_loop(
            windows,
            self.prompt_title.clone(),
            self.shutdown.clone(),
            self.reposition_period,
        ));

        let interrupt = self
            .handle_ctrl_c
            .then(|| spawn_interrupt_listener(self.shutdown.clone(), tokio::signal::ctrl_c()));

        let (detection_result, reposition_result) = tokio::select! {
            res = &mut detection => {
                self.settle("detection", &res);
                (res, reposition.await)
            }
            res = &mut reposition => {
                self.settle("reposition", &res);
                (detection.await, res)
            }
        };

        if let Some(interrupt) = interrupt {
            interrupt.abort();
        }

        detection_result.map_err(|e| anyhow::anyhow!("Detection loop panicked: {e}"))?;
        reposition_result.map_err(|e| anyhow::anyhow!("Reposition loop panicked: {e}"))?;

        let reason = self
            .shutdown
            .reason()
            .unwrap_or(ShutdownReason::Interrupted);
        log::info!("Monitor stopped ({reason})");
        Ok(reason)
    }

    fn settle(&self, name: &str, result: &Result<(), JoinError>) {
        if let Err(e) = result {
            log::error!("{name} loop panicked: {e}");
            self.shutdown
                .trigger(ShutdownReason::Fatal(format!("{name} loop panicked")));
        }
    }
}

/// Trigger `ShutdownReason::Interrupted` once `interrupt` resolves successfully
fn spawn_interrupt_listener<F>(shutdown: ShutdownSignal, interrupt: F) -> JoinHandle<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match interrupt.await {
            Ok(()) => {
                log::info!("Received Ctrl-C, shutting down...");
                shutdown.trigger(ShutdownReason::Interrupted);
            }
            Err(e) => log::warn!("Failed to listen for Ctrl-C: {e}"),
        }
    })
}
