use crate::registry::CoinRegistry;
use async_trait::async_trait;
use futures_util::future::join_all;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot of a coin's market state, as reported by whichever provider
/// answered first.
#[derive(Debug, Clone, Copy)]
pub struct MarketData {
    pub price: f64,
    pub change_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume: f64,
    pub market_cap: f64,
}

/// Source of current prices for the alert sweep.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price for one symbol, or None if it cannot be resolved.
    async fn price(&self, symbol: &str) -> Option<f64>;

    /// Prices for a batch of symbols, one request per symbol issued
    /// concurrently. Waits for every request before returning; symbols that
    /// failed are simply absent from the map.
    async fn prices(&self, symbols: &[String]) -> HashMap<String, f64> {
        let fetches = symbols.iter().map(|symbol| {
            let symbol = symbol.clone();
            async move {
                let price = self.price(&symbol).await;
                (symbol, price)
            }
        });
        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(symbol, price)| price.map(|p| (symbol, p)))
            .collect()
    }
}

/// Market data client with a first-success provider chain:
/// CoinGecko (only when an API key is configured) → Binance 24h ticker →
/// synthetic data from the coin registry. The chain never fails outright.
pub struct MarketDataFetcher {
    client: reqwest::Client,
    registry: CoinRegistry,
    coingecko_api_key: Option<String>,
    coingecko_base: String,
    binance_base: String,
}

impl MarketDataFetcher {
    pub fn new(coingecko_api_key: Option<String>) -> Self {
        Self::with_endpoints(
            coingecko_api_key,
            "https://api.coingecko.com",
            "https://api.binance.com",
        )
    }

    pub fn with_endpoints(
        coingecko_api_key: Option<String>,
        coingecko_base: impl Into<String>,
        binance_base: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            client,
            registry: CoinRegistry,
            coingecko_api_key,
            coingecko_base: coingecko_base.into(),
            binance_base: binance_base.into(),
        }
    }

    /// Full market snapshot for a symbol. Falls through the provider chain
    /// and degrades to synthetic data rather than failing.
    pub async fn market_data(&self, symbol: &str) -> MarketData {
        let symbol = symbol.to_uppercase();

        if let Some(data) = self.fetch_coingecko(&symbol).await {
            return data;
        }
        if let Some(data) = self.fetch_binance(&symbol).await {
            return data;
        }

        warn!("Falling back to synthetic market data for {}", symbol);
        self.synthetic(&symbol)
    }

    async fn fetch_coingecko(&self, symbol: &str) -> Option<MarketData> {
        // Consulted only when a key is configured.
        self.coingecko_api_key.as_ref()?;
        let coin = self.registry.get(symbol)?;

        let url = format!(
            "{}/api/v3/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false",
            self.coingecko_base, coin.coingecko_id
        );

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(json) => Some(parse_coingecko(&json)),
                    Err(e) => {
                        warn!("Failed to parse CoinGecko response for {}: {}", symbol, e);
                        None
                    }
                }
            }
            Ok(response) => {
                warn!("CoinGecko returned {} for {}", response.status(), symbol);
                None
            }
            Err(e) => {
                warn!("Error fetching from CoinGecko: {}", e);
                None
            }
        }
    }

    async fn fetch_binance(&self, symbol: &str) -> Option<MarketData> {
        let url = format!(
            "{}/api/v3/ticker/24hr?symbol={}USDT",
            self.binance_base, symbol
        );

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(json) => Some(parse_binance(&json)),
                    Err(e) => {
                        warn!("Failed to parse Binance response for {}: {}", symbol, e);
                        None
                    }
                }
            }
            Ok(response) => {
                warn!("Binance returned {} for {}", response.status(), symbol);
                None
            }
            Err(e) => {
                warn!("Error fetching from Binance: {}", e);
                None
            }
        }
    }

    /// Jittered demo data anchored on the registry's base price; unknown
    /// symbols get a generic base.
    fn synthetic(&self, symbol: &str) -> MarketData {
        let base = self
            .registry
            .get(symbol)
            .map(|coin| coin.base_price)
            .unwrap_or(100.0);

        let mut rng = rand::thread_rng();
        let price = base * (1.0 + rng.gen_range(-0.04..0.04));
        let change_24h = rng.gen_range(-5.0..5.0);
        MarketData {
            price,
            change_24h,
            high_24h: price * (1.0 + change_24h.abs() / 100.0 + rng.gen_range(0.0..0.02)),
            low_24h: price * (1.0 - change_24h.abs() / 100.0 - rng.gen_range(0.0..0.02)),
            volume: rng.gen_range(100_000_000.0..5_000_000_000.0),
            market_cap: rng.gen_range(1_000_000_000.0..1_000_000_000_000.0),
        }
    }
}

fn parse_coingecko(json: &Value) -> MarketData {
    let usd = |field: &str| {
        json.pointer(&format!("/market_data/{field}/usd"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    MarketData {
        price: usd("current_price"),
        change_24h: json
            .pointer("/market_data/price_change_percentage_24h")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        high_24h: usd("high_24h"),
        low_24h: usd("low_24h"),
        volume: usd("total_volume"),
        market_cap: usd("market_cap"),
    }
}

fn parse_binance(json: &Value) -> MarketData {
    let field = |name: &str| {
        json.get(name)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    MarketData {
        price: field("lastPrice"),
        change_24h: field("priceChangePercent"),
        high_24h: field("highPrice"),
        low_24h: field("lowPrice"),
        volume: field("volume"),
        // Binance does not report market cap.
        market_cap: 0.0,
    }
}

#[async_trait]
impl PriceSource for MarketDataFetcher {
    async fn price(&self, symbol: &str) -> Option<f64> {
        Some(self.market_data(symbol).await.price)
    }
}
