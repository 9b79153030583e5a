/// Static metadata for a supported coin: the CoinGecko asset id used by the
/// fetcher, and a base price for synthetic fallback data when every provider
/// is unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinInfo {
    pub coingecko_id: &'static str,
    pub base_price: f64,
}

pub const SUPPORTED_COINS: [&str; 10] = [
    "BTC", "ETH", "BNB", "ADA", "XRP", "SOL", "DOT", "DOGE", "AVAX", "MATIC",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CoinRegistry;

impl CoinRegistry {
    pub fn get(&self, symbol: &str) -> Option<CoinInfo> {
        match symbol.to_uppercase().as_str() {
            "BTC" => Some(CoinInfo {
                coingecko_id: "bitcoin",
                base_price: 50_000.0,
            }),
            "ETH" => Some(CoinInfo {
                coingecko_id: "ethereum",
                base_price: 3_000.0,
            }),
            "BNB" => Some(CoinInfo {
                coingecko_id: "binancecoin",
                base_price: 400.0,
            }),
            "ADA" => Some(CoinInfo {
                coingecko_id: "cardano",
                base_price: 1.2,
            }),
            "XRP" => Some(CoinInfo {
                coingecko_id: "ripple",
                base_price: 0.8,
            }),
            "SOL" => Some(CoinInfo {
                coingecko_id: "solana",
                base_price: 100.0,
            }),
            "DOT" => Some(CoinInfo {
                coingecko_id: "polkadot",
                base_price: 20.0,
            }),
            "DOGE" => Some(CoinInfo {
                coingecko_id: "dogecoin",
                base_price: 0.2,
            }),
            "AVAX" => Some(CoinInfo {
                coingecko_id: "avalanche-2",
                base_price: 60.0,
            }),
            "MATIC" => Some(CoinInfo {
                coingecko_id: "matic-network",
                base_price: 1.5,
            }),
            _ => None,
        }
    }

    pub fn is_supported(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }
}
