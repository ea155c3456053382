//! Thin Telegram transport shim: long-poll loop, message delivery, inline
//! keyboards. Routing decisions all live in [`crate::router`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::BotState;
use crate::error::BotError;
use crate::router::{self, EventContext, ReplyChannel};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Serializes straight into Telegram's `reply_markup` shape.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    token: String,
}

// long-poll window; request timeout leaves headroom above it
const POLL_TIMEOUT_SECS: u64 = 30;

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
        }
    }

    fn url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, BotError> {
        let res = self
            .http
            .post(self.url(method))
            .json(&params)
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .send()
            .await
            .map_err(|e| BotError::Delivery(format!("telegram {method}: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BotError::Delivery(format!(
                "telegram {method} failed: {status} {body}"
            )));
        }

        let parsed: ApiResponse<T> = res
            .json()
            .await
            .map_err(|e| BotError::Delivery(format!("telegram {method}: {e}")))?;

        if !parsed.ok {
            return Err(BotError::Delivery(format!("telegram {method} rejected")));
        }
        parsed
            .result
            .ok_or_else(|| BotError::Delivery(format!("telegram {method} returned no result")))
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError> {
        let mut params = json!({ "chat_id": chat_id, "text": text });
        if let Some(kb) = keyboard {
            params["reply_markup"] =
                serde_json::to_value(kb).map_err(|e| BotError::Internal(e.to_string()))?;
        }
        self.call::<serde_json::Value>("sendMessage", params)
            .await
            .map(|_| ())
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), BotError> {
        let mut params = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            params["reply_markup"] =
                serde_json::to_value(kb).map_err(|e| BotError::Internal(e.to_string()))?;
        }
        self.call::<serde_json::Value>("editMessageText", params)
            .await
            .map(|_| ())
    }

    /// Stops the client-side button spinner.
    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<(), BotError> {
        self.call::<serde_json::Value>(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_id }),
        )
        .await
        .map(|_| ())
    }
}

/// Per-event reply channel. Command replies post new messages; callback
/// replies edit the message the pressed button was attached to.
pub struct TelegramReply {
    client: TelegramClient,
    chat_id: i64,
    message_id: Option<i64>,
}

impl TelegramReply {
    pub fn new(client: TelegramClient, chat_id: i64) -> Self {
        Self {
            client,
            chat_id,
            message_id: None,
        }
    }

    pub fn for_callback(client: TelegramClient, chat_id: i64, message_id: i64) -> Self {
        Self {
            client,
            chat_id,
            message_id: Some(message_id),
        }
    }
}

#[async_trait]
impl ReplyChannel for TelegramReply {
    async fn reply(&self, text: &str) -> Result<(), BotError> {
        self.client.send_message(self.chat_id, text, None).await
    }

    async fn reply_with_keyboard(
        &self,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<(), BotError> {
        self.client
            .send_message(self.chat_id, text, Some(&keyboard))
            .await
    }

    async fn edit(&self, text: &str, keyboard: Option<InlineKeyboard>) -> Result<(), BotError> {
        match self.message_id {
            Some(message_id) => {
                self.client
                    .edit_message_text(self.chat_id, message_id, text, keyboard.as_ref())
                    .await
            }
            None => self
                .client
                .send_message(self.chat_id, text, keyboard.as_ref())
                .await,
        }
    }
}

/// Long-poll loop. Every update runs on its own task, so one slow handler
/// never blocks the stream or the other users.
pub async fn run_polling(
    state: BotState,
    client: TelegramClient,
    shutdown: tokio_util::sync::CancellationToken,
) {
    tracing::info!("telegram polling started");
    let mut offset = 0i64;

    loop {
        let updates = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("telegram polling stopped");
                return;
            }
            res = client.get_updates(offset) => res,
        };

        let updates = match updates {
            Ok(u) => u,
            Err(e) => {
                tracing::error!(error = %e, "getUpdates failed");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let state = state.clone();
            let client = client.clone();
            tokio::spawn(async move {
                handle_update(state, client, update).await;
            });
        }
    }
}

async fn handle_update(state: BotState, client: TelegramClient, update: Update) {
    if let Some(message) = update.message {
        let (Some(text), Some(from)) = (message.text, message.from) else {
            return;
        };
        let ctx = EventContext {
            user_id: from.id,
            chat_id: message.chat.id,
        };
        let reply = TelegramReply::new(client, message.chat.id);
        router::dispatch_command(&state, ctx, &text, &reply).await;
        return;
    }

    if let Some(query) = update.callback_query {
        if let Err(e) = client.answer_callback_query(&query.id).await {
            tracing::warn!(error = %e, "answerCallbackQuery failed");
        }

        let (Some(data), Some(message)) = (query.data, query.message) else {
            return;
        };
        let ctx = EventContext {
            user_id: query.from.id,
            chat_id: message.chat.id,
        };
        let reply = TelegramReply::for_callback(client, message.chat.id, message.message_id);
        router::dispatch_callback(&state, ctx, &data, &reply).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_serializes_to_reply_markup_shape() {
        let kb = InlineKeyboard::new(vec![vec![InlineButton::new("Go", "quote_refresh_AAPL")]]);
        let v = serde_json::to_value(&kb).unwrap();
        assert_eq!(
            v["inline_keyboard"][0][0]["callback_data"],
            "quote_refresh_AAPL"
        );
        assert_eq!(v["inline_keyboard"][0][0]["text"], "Go");
    }

    #[test]
    fn update_decodes_message_and_callback_variants() {
        let msg: Update = serde_json::from_str(
            r#"{"update_id": 7, "message": {"message_id": 1, "from": {"id": 42}, "chat": {"id": 42}, "text": "/quote AAPL"}}"#,
        )
        .unwrap();
        assert_eq!(msg.message.unwrap().text.as_deref(), Some("/quote AAPL"));
        assert!(msg.callback_query.is_none());

        let cb: Update = serde_json::from_str(
            r#"{"update_id": 8, "callback_query": {"id": "abc", "from": {"id": 42}, "message": {"message_id": 2, "chat": {"id": 42}}, "data": "watch_refresh"}}"#,
        )
        .unwrap();
        let q = cb.callback_query.unwrap();
        assert_eq!(q.data.as_deref(), Some("watch_refresh"));
        assert_eq!(q.message.unwrap().message_id, 2);
    }
}
