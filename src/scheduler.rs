use crate::domain::Alert;
use crate::evaluator;
use crate::notifier::Notifier;
use crate::price::PriceSource;
use crate::store::AlertStore;
use crate::utils::format_usd;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Background loop driving the alert sweep: sleep, evaluate, notify, repeat.
/// The interval is fixed and does not account for sweep duration. Nothing
/// that happens inside a cycle terminates the loop; failures are logged and
/// the next cycle runs as scheduled.
pub struct AlertMonitor<P, N> {
    store: AlertStore,
    price_source: Arc<P>,
    notifier: Arc<N>,
    interval: Duration,
}

impl<P, N> AlertMonitor<P, N>
where
    P: PriceSource + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        store: AlertStore,
        price_source: Arc<P>,
        notifier: Arc<N>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            price_source,
            notifier,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("⏰ Alert monitor started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }

            let triggered = evaluator::sweep(&self.store, self.price_source.as_ref()).await;
            for (alert, price) in triggered {
                let text = trigger_message(&alert, price);
                if let Err(e) = self.notifier.notify(alert.user_id, &text).await {
                    error!(
                        "Error sending alert notification to user {}: {}",
                        alert.user_id, e
                    );
                }
            }
        }

        // Final flush waits out any in-flight background write before
        // leaving a fresh snapshot on disk.
        self.store.persist().await;
        info!("⏰ Alert monitor stopped");
    }
}

fn trigger_message(alert: &Alert, price: f64) -> String {
    format!(
        "🚨 <b>Price Alert Triggered!</b>\n\n\
         <b>Coin:</b> {}\n\
         <b>Condition:</b> Price {} ${}\n\
         <b>Current Price:</b> ${}\n\n\
         <i>This alert will now be removed.</i>",
        alert.symbol,
        alert.condition,
        format_usd(alert.threshold),
        format_usd(price)
    )
}
