use crate::commands::CommandHandler;
use crate::notifier::TelegramNotifier;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram long-poll loop: fetch updates, dispatch each text message to the
/// command handler, reply in the same chat. Per-update failures are logged
/// and skipped; a failed poll backs off briefly and retries.
pub struct TelegramBot {
    telegram: TelegramNotifier,
    handler: CommandHandler,
}

impl TelegramBot {
    pub fn new(telegram: TelegramNotifier, handler: CommandHandler) -> Self {
        Self { telegram, handler }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("🤖 Telegram command loop started");
        let mut offset = 0i64;

        loop {
            let updates = tokio::select! {
                result = self.telegram.get_updates(offset) => result,
                _ = shutdown.changed() => break,
            };

            match updates {
                Ok((next_offset, messages)) => {
                    offset = next_offset;
                    for message in messages {
                        let reply = self.handler.handle(message.chat_id, &message.text).await;
                        if let Err(e) = self.telegram.send_message(message.chat_id, &reply).await {
                            warn!("Failed to reply to user {}: {}", message.chat_id, e);
                        }
                    }
                }
                Err(e) => {
                    warn!("Error polling Telegram updates: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }

        info!("🤖 Telegram command loop stopped");
    }
}
