//! Library entrypoint for stockbot.
//!
//! This file exists mainly to make router and monitor tests easy
//! (integration tests under `tests/` can import the bot state, router,
//! handlers, services).

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod handlers;
pub mod router;
pub mod telegram;

use services::auth_service::AuthGate;
use services::market::MarketData;
use services::notifier::NotificationSink;
use services::store::UserStore;

#[derive(Clone)]
pub struct BotState {
    pub settings: config::Settings,
    pub market: Arc<dyn MarketData>,
    pub notifier: Arc<dyn NotificationSink>,
    pub auth: AuthGate,
    pub store: UserStore,
}
