use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub telegram_bot_token: String,

    pub broker_api_base: String,
    pub broker_api_key: String,

    // empty = open mode (anyone may use the bot)
    pub authorized_users: Vec<i64>,

    pub alert_poll_secs: u64,
    pub alert_backoff_secs: u64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();

    let broker_api_base = env::var("BROKER_API_BASE")
        .unwrap_or_else(|_| "https://api.schwabapi.com".to_string());

    let broker_api_key = env::var("BROKER_API_KEY").unwrap_or_default();

    let authorized_users = env::var("AUTHORIZED_USERS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect();

    let alert_poll_secs = env::var("ALERT_POLL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(30);

    let alert_backoff_secs = env::var("ALERT_BACKOFF_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60);

    Settings {
        telegram_bot_token,
        broker_api_base,
        broker_api_key,
        authorized_users,
        alert_poll_secs,
        alert_backoff_secs,
    }
}
