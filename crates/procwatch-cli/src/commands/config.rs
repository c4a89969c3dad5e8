/// Configuration command handler
use anyhow::Result;
use procwatch_core::{config::default_config_path, MonitorConfig};
use procwatch_storage::UsageLedger;

pub fn show_config(config: &MonitorConfig) -> Result<()> {
    let ledger_path = config
        .usage
        .store_file
        .clone()
        .unwrap_or_else(UsageLedger::default_ledger_path);

    println!("# Default config file: {}", default_config_path()?.display());
    println!("# Ledger file: {}", ledger_path.display());
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
