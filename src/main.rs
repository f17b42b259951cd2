use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;

use wallet_ledger::config::AppConfig;
use wallet_ledger::history::{self, HistoryView};
use wallet_ledger::ledger::{LedgerStore, SharedLedger};
use wallet_ledger::metrics;

const CONFIG_ENV: &str = "WALLET_LEDGER_CONFIG";

fn load_config() -> Result<AppConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => AppConfig::load(&PathBuf::from(path)),
        None => Ok(AppConfig::default()),
    }
}

fn main() -> Result<()> {
    let config = load_config()?;

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.filter))
        .init();
    metrics::init_metrics();

    let mut args = std::env::args().skip(1);
    let owner = args.next();
    let chain_id = args
        .next()
        .map(|raw| raw.parse::<u64>().with_context(|| format!("invalid chain id {raw}")))
        .transpose()?;

    let store = LedgerStore::new(&config.store.path);
    let ledger = SharedLedger::new(store.load()?);
    info!(
        "Loaded {} transactions from {}",
        ledger.len(),
        store.path().display()
    );

    let Some(owner) = owner else {
        println!("{}", serde_json::to_string_pretty(&ledger.state().records())?);
        return Ok(());
    };

    let view: HistoryView = match config.time_zone() {
        Some(tz) => ledger.history(&owner, chain_id, &Utc::now().with_timezone(&tz)),
        None => history::aggregate_local(ledger.snapshot(&owner, chain_id)),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    info!("Metrics: {}", metrics::get_metrics());

    Ok(())
}
