use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: Option<String>,
    pub coingecko_api_key: Option<String>,
    pub storage_path: PathBuf,
    pub alert_check_interval: Duration,
}

impl AppConfig {
    /// All settings are optional: without a Telegram token the bot runs in
    /// console-only mode, without a CoinGecko key the fetcher starts at
    /// Binance. An unparsable interval falls back to the default.
    pub fn from_env() -> Self {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let coingecko_api_key = env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let storage_path = env::var("ALERT_STORAGE_PATH")
            .unwrap_or_else(|_| "alerts.json".to_string())
            .into();

        let alert_check_interval = env::var("ALERT_CHECK_INTERVAL")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CHECK_INTERVAL);

        Self {
            telegram_bot_token,
            coingecko_api_key,
            storage_path,
            alert_check_interval,
        }
    }
}
