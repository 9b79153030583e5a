pub mod analysis;
pub mod bot;
pub mod commands;
pub mod config;
pub mod domain;
pub mod evaluator;
pub mod notifier;
pub mod price;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod utils;

use analysis::AnalysisEngine;
use bot::TelegramBot;
use commands::CommandHandler;
use config::AppConfig;
use notifier::{ConsoleNotifier, NotifierHub, TelegramNotifier};
use price::MarketDataFetcher;
use scheduler::AlertMonitor;
use store::AlertStore;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env();
    let store = AlertStore::load(&config.storage_path);
    let fetcher = Arc::new(MarketDataFetcher::new(config.coingecko_api_key.clone()));

    let telegram = TelegramNotifier::maybe_from_config(&config);
    if telegram.is_some() {
        info!("📱 Telegram notifications enabled");
    } else {
        info!("📱 Telegram notifications disabled (no credentials), console only");
    }
    let notifier = Arc::new(NotifierHub::new(ConsoleNotifier::new(), telegram.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor = AlertMonitor::new(
        store.clone(),
        Arc::clone(&fetcher),
        notifier,
        config.alert_check_interval,
    );
    let monitor_handle = tokio::spawn(monitor.run(shutdown_rx.clone()));

    let bot_handle = telegram.map(|telegram| {
        let handler = CommandHandler::new(store.clone(), Arc::clone(&fetcher), AnalysisEngine::new());
        tokio::spawn(TelegramBot::new(telegram, handler).run(shutdown_rx.clone()))
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, stopping background tasks");
    let _ = shutdown_tx.send(true);

    monitor_handle.await?;
    if let Some(handle) = bot_handle {
        handle.await?;
    }
    store.persist().await;

    Ok(())
}
