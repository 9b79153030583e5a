mod console;
mod telegram;

pub use console::ConsoleNotifier;
pub use telegram::{IncomingMessage, TelegramNotifier};

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Delivers a message to the owning user of a triggered alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: i64, text: &str) -> Result<()>;
}

/// Console always, Telegram when credentials are configured. A Telegram
/// delivery failure is logged per message and contained; it never fails the
/// hub or blocks other deliveries.
pub struct NotifierHub {
    console: ConsoleNotifier,
    telegram: Option<TelegramNotifier>,
}

impl NotifierHub {
    pub fn new(console: ConsoleNotifier, telegram: Option<TelegramNotifier>) -> Self {
        Self { console, telegram }
    }
}

#[async_trait]
impl Notifier for NotifierHub {
    async fn notify(&self, user_id: i64, text: &str) -> Result<()> {
        self.console.notify(user_id, text).await?;

        if let Some(telegram) = &self.telegram {
            if let Err(e) = telegram.notify(user_id, text).await {
                warn!("Telegram notification failed for user {}: {}", user_id, e);
            }
        }

        Ok(())
    }
}
