/// Monitor lifecycle command handler
use anyhow::Result;
use procwatch_core::{
    dialog::create_dialog, window::create_window_system, MonitorConfig, PromptController,
    Scheduler, ShutdownReason, ShutdownSignal, SysinfoProcessSource, UsageMonitor,
};
use procwatch_storage::UsageLedger;

pub async fn run_monitor(config: MonitorConfig) -> Result<()> {
    let ledger = UsageLedger::open(config.usage.store_file.clone())?;
    let shutdown = ShutdownSignal::new();

    let monitor = UsageMonitor::new(ledger, &config);
    let controller = PromptController::new(
        Box::new(monitor),
        create_dialog(),
        shutdown.clone(),
        config.monitor.prompt_window_title.clone(),
    )
    .with_persistence_policy(config.monitor.persistence_policy);

    log::info!(
        "Watching for {} (prompt: \"{}\")",
        config.monitor.process_name,
        config.monitor.prompt_window_title
    );

    let reason = Scheduler::from_config(&config, shutdown)
        .run(
            Box::new(SysinfoProcessSource::new()),
            controller,
            create_window_system()?,
        )
        .await?;

    match reason {
        ShutdownReason::Fatal(msg) => anyhow::bail!("Monitor stopped after a fatal error: {msg}"),
        other => {
            log::info!("Monitor exited: {other}");
            Ok(())
        }
    }
}
