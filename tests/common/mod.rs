//! Shared test doubles: an in-memory market port, a recording reply
//! channel, and a recording notification sink.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use stockbot::BotState;
use stockbot::config::Settings;
use stockbot::error::BotError;
use stockbot::models::{AccountDetails, AccountRef, MoverItem, Quote};
use stockbot::router::ReplyChannel;
use stockbot::services::auth_service::AuthGate;
use stockbot::services::market::{MarketData, MarketError};
use stockbot::services::notifier::NotificationSink;
use stockbot::services::store::UserStore;
use stockbot::telegram::InlineKeyboard;

/// Market port backed by a mutable quote table. Symbols absent from the
/// table resolve to not-found; symbols marked failing return a transient
/// error.
#[derive(Default)]
pub struct MockMarket {
    quotes: Mutex<HashMap<String, Quote>>,
    failing: Mutex<HashSet<String>>,
}

impl MockMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, symbol: &str, price: f64) {
        let quote = Quote {
            symbol: symbol.to_string(),
            last_price: price,
            ..Default::default()
        };
        self.quotes.lock().await.insert(symbol.to_string(), quote);
    }

    pub async fn set_quote(&self, quote: Quote) {
        self.quotes
            .lock()
            .await
            .insert(quote.symbol.clone(), quote);
    }

    pub async fn set_failing(&self, symbol: &str) {
        self.failing.lock().await.insert(symbol.to_string());
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>, MarketError> {
        if self.failing.lock().await.contains(symbol) {
            return Err(MarketError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(self.quotes.lock().await.get(symbol).cloned())
    }

    async fn get_movers(&self, _index: &str) -> Result<Vec<MoverItem>, MarketError> {
        Ok(Vec::new())
    }

    async fn get_accounts(&self) -> Result<Vec<AccountRef>, MarketError> {
        Ok(Vec::new())
    }

    async fn get_account_details(
        &self,
        _account_hash: &str,
        _fields: Option<&str>,
    ) -> Result<AccountDetails, MarketError> {
        Ok(AccountDetails::default())
    }
}

/// Records every reply instead of talking to a chat transport.
#[derive(Default)]
pub struct MockReply {
    messages: Mutex<Vec<(String, Option<InlineKeyboard>)>>,
}

impl MockReply {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .await
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub async fn last_keyboard(&self) -> Option<InlineKeyboard> {
        self.messages
            .lock()
            .await
            .last()
            .and_then(|(_, kb)| kb.clone())
    }
}

#[async_trait]
impl ReplyChannel for MockReply {
    async fn reply(&self, text: &str) -> Result<(), BotError> {
        self.messages.lock().await.push((text.to_string(), None));
        Ok(())
    }

    async fn reply_with_keyboard(
        &self,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<(), BotError> {
        self.messages
            .lock()
            .await
            .push((text.to_string(), Some(keyboard)));
        Ok(())
    }

    async fn edit(&self, text: &str, keyboard: Option<InlineKeyboard>) -> Result<(), BotError> {
        self.messages
            .lock()
            .await
            .push((text.to_string(), keyboard));
        Ok(())
    }
}

/// Records alert notifications.
#[derive(Default)]
pub struct MockSink {
    sent: Mutex<Vec<(i64, String)>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn test_settings() -> Settings {
    Settings {
        telegram_bot_token: String::new(),
        broker_api_base: "http://localhost".to_string(),
        broker_api_key: String::new(),
        authorized_users: Vec::new(),
        alert_poll_secs: 30,
        alert_backoff_secs: 60,
    }
}

pub fn test_state(
    market: Arc<MockMarket>,
    notifier: Arc<MockSink>,
    allowed: Vec<i64>,
) -> BotState {
    BotState {
        settings: test_settings(),
        market,
        notifier,
        auth: AuthGate::new(allowed),
        store: UserStore::new(),
    }
}
