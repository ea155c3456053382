use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::BotState;
use crate::services::market::MarketError;

/// Absolute price tolerance for a trigger; an alert fires on approach from
/// either side.
pub const TRIGGER_EPSILON: f64 = 0.01;

pub fn spawn_alert_monitor(state: BotState, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let sleep_secs = match run_pass(&state).await {
                Ok(()) => state.settings.alert_poll_secs,
                Err(e) => {
                    tracing::error!(error = %e, "alert pass failed, backing off");
                    state.settings.alert_backoff_secs
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("alert monitor stopped");
                    return;
                }
                _ = tokio::time::sleep(Duration::from_secs(sleep_secs)) => {}
            }
        }
    })
}

/// One full scan over every user's alerts.
///
/// Works from a snapshot, so command handlers are free to mutate lists
/// mid-pass. A single symbol's lookup failure is logged and skipped; Err
/// means the whole pass produced nothing but failures and the caller
/// should back off.
pub async fn run_pass(state: &BotState) -> Result<(), MarketError> {
    let snapshot = state.store.alerts_snapshot().await;

    let mut last_err: Option<MarketError> = None;
    let mut any_ok = false;

    for (user_id, alerts) in snapshot {
        for alert in alerts {
            let quote = match state.market.get_quote(&alert.symbol).await {
                Ok(q) => {
                    any_ok = true;
                    q
                }
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        symbol = %alert.symbol,
                        error = %e,
                        "alert quote lookup failed"
                    );
                    last_err = Some(e);
                    continue;
                }
            };

            let Some(quote) = quote else {
                continue;
            };

            let price = quote.last_price;
            if !price.is_finite() || price <= 0.0 {
                continue;
            }

            if (price - alert.target_price).abs() > TRIGGER_EPSILON {
                continue;
            }

            // Compare-and-remove first: only the pass that wins the removal
            // sends the notification, so each trigger is delivered once.
            if !state.store.remove_alert(user_id, alert.id).await {
                continue;
            }

            tracing::info!(
                user_id,
                symbol = %alert.symbol,
                price,
                target = alert.target_price,
                "alert triggered"
            );

            let text = format!(
                "🚨 Price Alert Triggered!\n\nSymbol: {}\nTarget: ${:.2}\nCurrent: ${:.2}",
                alert.symbol, alert.target_price, price
            );
            if let Err(e) = state.notifier.send(alert.chat_id, &text).await {
                tracing::warn!(
                    user_id,
                    chat_id = alert.chat_id,
                    error = %e,
                    "alert notification delivery failed"
                );
            }
        }
    }

    match last_err {
        Some(e) if !any_ok => Err(e),
        _ => Ok(()),
    }
}
