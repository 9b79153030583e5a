use crate::domain::Alert;
use crate::price::PriceSource;
use crate::store::AlertStore;
use chrono::Utc;
use std::collections::HashMap;
use tracing::debug;

/// One evaluation pass over all outstanding alerts.
///
/// Collects the deduplicated set of symbols with pending alerts, fetches
/// their prices in one batch, marks condition-met alerts triggered, and
/// prunes expired triggered alerts. When nothing is pending the price fetch
/// is skipped entirely; the expiry sweep still runs so stale triggered
/// alerts do not linger.
pub async fn sweep<P: PriceSource + ?Sized>(
    store: &AlertStore,
    price_source: &P,
) -> Vec<(Alert, f64)> {
    let symbols = store.pending_symbols();

    let prices: HashMap<String, f64> = if symbols.is_empty() {
        HashMap::new()
    } else {
        debug!("Checking {} symbol(s) with pending alerts", symbols.len());
        price_source.prices(&symbols).await
    };

    store.sweep_with_prices(&prices, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::sweep;
    use crate::domain::AlertCondition;
    use crate::price::PriceSource;
    use crate::store::AlertStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct StubPrices {
        prices: HashMap<String, f64>,
        requested: Mutex<Vec<String>>,
    }

    impl StubPrices {
        fn new(entries: &[(&str, f64)]) -> Self {
            Self {
                prices: entries
                    .iter()
                    .map(|(s, p)| (s.to_string(), *p))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PriceSource for StubPrices {
        async fn price(&self, symbol: &str) -> Option<f64> {
            self.requested.lock().unwrap().push(symbol.to_string());
            self.prices.get(symbol).copied()
        }
    }

    fn temp_store(name: &str) -> AlertStore {
        let path: PathBuf = std::env::temp_dir().join(format!(
            "coinsentry-eval-{name}-{}-{:?}.json",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = std::fs::remove_file(&path);
        AlertStore::load(path)
    }

    #[tokio::test]
    async fn triggers_and_reports_then_stays_quiet() {
        let store = temp_store("scenario");
        let id = store.add(1, "BTC", AlertCondition::Above, 50_000.0);

        let source = StubPrices::new(&[("BTC", 51_000.0)]);
        let triggered = sweep(&store, &source).await;
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].0.id, id);
        assert_eq!(triggered[0].1, 51_000.0);

        let source = StubPrices::new(&[("BTC", 52_000.0)]);
        assert!(sweep(&store, &source).await.is_empty());
    }

    #[tokio::test]
    async fn fetches_each_symbol_once_per_cycle() {
        let store = temp_store("dedup");
        store.add(1, "BTC", AlertCondition::Above, 60_000.0);
        store.add(2, "BTC", AlertCondition::Below, 40_000.0);
        store.add(2, "ETH", AlertCondition::Above, 10_000.0);

        let source = StubPrices::new(&[("BTC", 50_000.0), ("ETH", 3_000.0)]);
        sweep(&store, &source).await;

        let mut requests = source.requests();
        requests.sort();
        assert_eq!(requests, vec!["BTC".to_string(), "ETH".to_string()]);
    }

    #[tokio::test]
    async fn same_symbol_alerts_evaluate_independently() {
        let store = temp_store("independent");
        store.add(1, "BTC", AlertCondition::Above, 50_000.0);
        store.add(2, "BTC", AlertCondition::Above, 55_000.0);

        let source = StubPrices::new(&[("BTC", 51_000.0)]);
        let triggered = sweep(&store, &source).await;

        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].0.user_id, 1);
        assert!(!store.alerts_for(2)[0].triggered);
    }

    #[tokio::test]
    async fn skips_price_fetch_when_nothing_is_pending() {
        let store = temp_store("nofetch");
        let source = StubPrices::new(&[("BTC", 50_000.0)]);

        assert!(sweep(&store, &source).await.is_empty());
        assert!(source.requests().is_empty(), "no symbols, no fetch");
    }

    #[tokio::test]
    async fn missing_price_skips_only_that_symbol() {
        let store = temp_store("partial");
        store.add(1, "BTC", AlertCondition::Above, 50_000.0);
        store.add(1, "ETH", AlertCondition::Above, 2_000.0);

        // ETH price unavailable this cycle.
        let source = StubPrices::new(&[("BTC", 51_000.0)]);
        let triggered = sweep(&store, &source).await;

        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].0.symbol, "BTC");
        let pending: Vec<_> = store
            .alerts_for(1)
            .into_iter()
            .filter(|a| !a.triggered)
            .collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].symbol, "ETH");
    }
}
