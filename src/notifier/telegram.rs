use super::Notifier;
use crate::config::AppConfig;
use crate::utils::mask_token;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Long-poll wait requested from Telegram; the HTTP timeout sits above it so
/// an idle poll is not cut off client-side.
const POLL_TIMEOUT_SECS: u64 = 30;
const HTTP_TIMEOUT: Duration = Duration::from_secs(40);

/// A text message received from a chat, with the update id used to advance
/// the long-poll offset.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub update_id: i64,
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self::with_api_base(bot_token, "https://api.telegram.org")
    }

    pub fn with_api_base(bot_token: String, api_base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            bot_token,
            api_base: api_base.into(),
            client,
        }
    }

    pub fn maybe_from_config(config: &AppConfig) -> Option<Self> {
        match &config.telegram_bot_token {
            Some(token) if !token.is_empty() => {
                info!("Telegram bot configured ({})", mask_token(token));
                Some(Self::new(token.clone()))
            }
            _ => None,
        }
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML"
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Failed to send Telegram message: {}", error_text);
            Err(anyhow!("Telegram sendMessage failed"))
        }
    }

    /// Long-poll for updates starting at `offset`. Returns the next offset
    /// (advanced past every received update, text or not) and the text
    /// messages to dispatch.
    pub async fn get_updates(&self, offset: i64) -> Result<(i64, Vec<IncomingMessage>)> {
        let url = format!("{}/bot{}/getUpdates", self.api_base, self.bot_token);
        let payload = serde_json::json!({
            "offset": offset,
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message"]
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let json: Value = response.json().await?;

        let mut next_offset = offset;
        let mut messages = Vec::new();

        if let Some(updates) = json.get("result").and_then(Value::as_array) {
            for update in updates {
                let Some(update_id) = update.get("update_id").and_then(Value::as_i64) else {
                    continue;
                };
                next_offset = next_offset.max(update_id + 1);

                let chat_id = update.pointer("/message/chat/id").and_then(Value::as_i64);
                let text = update.pointer("/message/text").and_then(Value::as_str);
                if let (Some(chat_id), Some(text)) = (chat_id, text) {
                    messages.push(IncomingMessage {
                        update_id,
                        chat_id,
                        text: text.to_string(),
                    });
                }
            }
        }

        Ok((next_offset, messages))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, user_id: i64, text: &str) -> Result<()> {
        self.send_message(user_id, text).await?;
        info!("Alert notification delivered to Telegram user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, TelegramNotifier};
    use crate::config::AppConfig;
    use mockito::Server;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_with_token(token: Option<&str>) -> AppConfig {
        AppConfig {
            telegram_bot_token: token.map(String::from),
            coingecko_api_key: None,
            storage_path: PathBuf::from("alerts.json"),
            alert_check_interval: Duration::from_secs(60),
        }
    }

    #[test]
    fn built_only_when_a_token_is_present() {
        assert!(TelegramNotifier::maybe_from_config(&config_with_token(Some("123:abc"))).is_some());
        assert!(TelegramNotifier::maybe_from_config(&config_with_token(Some(""))).is_none());
        assert!(TelegramNotifier::maybe_from_config(&config_with_token(None)).is_none());
    }

    #[tokio::test]
    async fn delivers_messages_via_send_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let notifier = TelegramNotifier::with_api_base("123:abc".to_string(), server.url());
        notifier.notify(42, "BTC crossed 50000").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delivery_failure_surfaces_as_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(403)
            .with_body(r#"{"ok":false,"description":"Forbidden: bot was blocked"}"#)
            .create_async()
            .await;

        let notifier = TelegramNotifier::with_api_base("123:abc".to_string(), server.url());
        assert!(notifier.notify(42, "hello").await.is_err());
    }

    #[tokio::test]
    async fn get_updates_advances_offset_past_non_text_updates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/getUpdates")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok":true,"result":[
                    {"update_id":10,"message":{"chat":{"id":7},"text":"/myalerts"}},
                    {"update_id":11,"message":{"chat":{"id":8},"photo":[]}}
                ]}"#,
            )
            .create_async()
            .await;

        let notifier = TelegramNotifier::with_api_base("123:abc".to_string(), server.url());
        let (next_offset, messages) = notifier.get_updates(0).await.unwrap();

        assert_eq!(next_offset, 12);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].chat_id, 7);
        assert_eq!(messages[0].text, "/myalerts");
    }
}
