use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use stockbot::BotState;
use stockbot::config;
use stockbot::services::alert_monitor;
use stockbot::services::auth_service::AuthGate;
use stockbot::services::market::BrokerClient;
use stockbot::services::notifier::TelegramNotifier;
use stockbot::services::store::UserStore;
use stockbot::telegram::{self, TelegramClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();
    if settings.telegram_bot_token.is_empty() {
        tracing::error!("TELEGRAM_BOT_TOKEN is missing in .env");
        std::process::exit(1);
    }

    let tg = TelegramClient::new(settings.telegram_bot_token.clone());
    let broker = BrokerClient::new(
        settings.broker_api_base.clone(),
        settings.broker_api_key.clone(),
    );

    let state = BotState {
        auth: AuthGate::new(settings.authorized_users.iter().copied()),
        store: UserStore::new(),
        market: Arc::new(broker),
        notifier: Arc::new(TelegramNotifier::new(tg.clone())),
        settings,
    };

    let shutdown = CancellationToken::new();

    let monitor = alert_monitor::spawn_alert_monitor(state.clone(), shutdown.clone());

    let polling = {
        let state = state.clone();
        let tg = tg.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { telegram::run_polling(state, tg, shutdown).await })
    };

    tracing::info!("stockbot running, press ctrl-c to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }

    shutdown.cancel();
    let _ = polling.await;
    let _ = monitor.await;

    tracing::info!("stockbot stopped");
}
