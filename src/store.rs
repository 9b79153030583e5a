use crate::domain::{Alert, AlertCondition};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

/// How long a triggered alert is retained before the expiry sweep drops it.
/// Measured from `created_at`, not from the trigger time.
pub const GRACE_WINDOW_HOURS: i64 = 24;

/// The persisted document: owner buckets keyed by user id (as a string, the
/// way it lands in JSON) plus the monotonic id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    alerts: HashMap<String, Vec<Alert>>,
    #[serde(default = "default_next_id")]
    next_id: u64,
}

fn default_next_id() -> u64 {
    1
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            alerts: HashMap::new(),
            next_id: 1,
        }
    }
}

/// Durable collection of user alerts. All mutation goes through this type so
/// the persisted file stays consistent with in-memory state.
///
/// Concurrency discipline: the in-memory state sits behind one mutex that is
/// held only for the duration of an in-memory edit. Persistence is dispatched
/// as a background task after the lock is released; writes serialize through
/// a single-writer async lock and each write snapshots the freshest state, so
/// out-of-order task scheduling cannot write a stale or half-mutated document.
#[derive(Clone)]
pub struct AlertStore {
    path: Arc<PathBuf>,
    state: Arc<Mutex<StoreState>>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl AlertStore {
    /// Read persisted alerts from `path`. A missing file or unreadable
    /// document degrades to an empty store with `next_id = 1`; the failure is
    /// logged, never raised.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoreState>(&raw) {
                Ok(state) => {
                    info!(
                        "📂 Loaded alerts for {} user(s) from {}",
                        state.alerts.len(),
                        path.display()
                    );
                    state
                }
                Err(e) => {
                    error!("Error loading alerts from {}: {}", path.display(), e);
                    StoreState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No alert file at {}, starting empty", path.display());
                StoreState::default()
            }
            Err(e) => {
                error!("Error loading alerts from {}: {}", path.display(), e);
                StoreState::default()
            }
        };

        Self {
            path: Arc::new(path),
            state: Arc::new(Mutex::new(state)),
            writer: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn locked(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("alert store mutex poisoned")
    }

    /// Register a new alert and return its id. The symbol is uppercased;
    /// threshold validation is the caller's responsibility. The follow-up
    /// persistence write runs in the background and is not awaited.
    pub fn add(
        &self,
        user_id: i64,
        symbol: &str,
        condition: AlertCondition,
        threshold: f64,
    ) -> u64 {
        let id = {
            let mut state = self.locked();
            let id = state.next_id;
            state.next_id += 1;

            let alert = Alert {
                id,
                user_id,
                symbol: symbol.to_uppercase(),
                condition,
                threshold,
                created_at: Utc::now(),
                triggered: false,
            };
            state
                .alerts
                .entry(user_id.to_string())
                .or_default()
                .push(alert);
            id
        };

        self.schedule_persist();
        id
    }

    /// All alerts for a user (triggered or not), in insertion order.
    pub fn alerts_for(&self, user_id: i64) -> Vec<Alert> {
        self.locked()
            .alerts
            .get(&user_id.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Remove an alert from the user's own bucket. Unknown ids, and ids that
    /// belong to a different user, return false and change nothing.
    pub fn remove(&self, user_id: i64, alert_id: u64) -> bool {
        let removed = {
            let mut state = self.locked();
            match state.alerts.get_mut(&user_id.to_string()) {
                Some(bucket) => {
                    let before = bucket.len();
                    bucket.retain(|a| a.id != alert_id);
                    bucket.len() != before
                }
                None => false,
            }
        };

        if removed {
            self.schedule_persist();
        }
        removed
    }

    /// Distinct symbols referenced by non-triggered alerts across all users.
    /// The sweep fetches each of these exactly once per cycle.
    pub fn pending_symbols(&self) -> Vec<String> {
        let state = self.locked();
        let mut symbols: HashSet<String> = HashSet::new();
        for bucket in state.alerts.values() {
            for alert in bucket {
                if !alert.triggered {
                    symbols.insert(alert.symbol.clone());
                }
            }
        }
        symbols.into_iter().collect()
    }

    /// Evaluate all pending alerts against `prices`, then run the expiry
    /// sweep, all under a single lock acquisition. Returns the alerts that
    /// newly triggered this cycle, paired with the observed price. A missing
    /// or non-positive price skips the symbol for this cycle.
    pub fn sweep_with_prices(
        &self,
        prices: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Vec<(Alert, f64)> {
        let mut triggered = Vec::new();
        let mut changed = false;

        {
            let mut state = self.locked();

            for bucket in state.alerts.values_mut() {
                for alert in bucket.iter_mut() {
                    if alert.triggered {
                        continue;
                    }
                    let Some(&price) = prices.get(&alert.symbol) else {
                        continue;
                    };
                    if price <= 0.0 {
                        continue;
                    }
                    if alert.condition.is_met(price, alert.threshold) {
                        alert.triggered = true;
                        triggered.push((alert.clone(), price));
                        changed = true;
                    }
                }
            }

            // Drop triggered alerts whose grace window has elapsed.
            let cutoff = Duration::hours(GRACE_WINDOW_HOURS);
            for bucket in state.alerts.values_mut() {
                let before = bucket.len();
                bucket.retain(|a| !a.triggered || now - a.created_at < cutoff);
                if bucket.len() != before {
                    changed = true;
                }
            }
        }

        if changed {
            self.schedule_persist();
        }
        triggered
    }

    /// Fire-and-forget persistence; callers do not await completion.
    pub fn schedule_persist(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            store.persist().await;
        });
    }

    /// Write the full store to disk. Serialized against concurrent writes by
    /// the single-writer lock; the snapshot is taken under the state lock
    /// after the writer lock is held, so the freshest state always wins. A
    /// failed write is logged and the in-memory state stays authoritative.
    pub async fn persist(&self) {
        let _writer = self.writer.lock().await;

        let snapshot = {
            let state = self.locked();
            serde_json::to_string_pretty(&*state)
        };
        let json = match snapshot {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing alerts: {}", e);
                return;
            }
        };

        if let Err(e) = tokio::fs::write(self.path.as_ref(), json).await {
            error!("Error saving alerts to {}: {}", self.path.display(), e);
        }
    }
}
