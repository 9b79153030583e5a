use super::Notifier;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, user_id: i64, text: &str) -> Result<()> {
        println!("🔔 [user {user_id}] {text}");
        info!("Alert notification sent to console for user {}", user_id);
        Ok(())
    }
}
