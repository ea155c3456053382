use async_trait::async_trait;

use crate::error::BotError;
use crate::telegram::TelegramClient;

/// Delivery of notifications outside the request/response cycle (alert
/// triggers). Best effort: callers log failures and move on, nothing is
/// retried here.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), BotError>;
}

pub struct TelegramNotifier {
    client: TelegramClient,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.client.send_message(chat_id, text, None).await
    }
}
