use crate::BotState;
use crate::error::BotError;
use crate::handlers::parse_symbol;
use crate::router::{EventContext, ReplyChannel};

pub async fn create(
    state: &BotState,
    ctx: EventContext,
    args: &[String],
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let [raw_symbol, raw_price] = args else {
        return Err(BotError::Validation(
            "Usage: /alert SYMBOL PRICE\nExample: /alert AAPL 150.00".to_string(),
        ));
    };
    let symbol = parse_symbol(raw_symbol)?;
    let target: f64 = raw_price
        .parse()
        .ok()
        .filter(|p: &f64| p.is_finite() && *p > 0.0)
        .ok_or_else(|| BotError::Validation("❌ Invalid price format".to_string()))?;

    let alert = state
        .store
        .with_user(ctx.user_id, |u| {
            u.create_alert(ctx.user_id, &symbol, target, ctx.chat_id)
        })
        .await;

    reply
        .reply(&format!(
            "✅ Alert created!\nSymbol: {}\nTarget: ${:.2}\nAlert ID: {}",
            alert.symbol, alert.target_price, alert.id
        ))
        .await
}

pub async fn list(
    state: &BotState,
    ctx: EventContext,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let alerts = state.store.with_user(ctx.user_id, |u| u.alerts.clone()).await;

    if alerts.is_empty() {
        return reply.reply("📭 No active alerts").await;
    }

    let mut msg = String::from("🔔 Your Active Alerts\n\n");
    for a in &alerts {
        msg.push_str(&format!(
            "• ID: {} - {} @ ${:.2}\n",
            a.id, a.symbol, a.target_price
        ));
    }
    reply.reply(&msg).await
}

pub async fn delete(
    state: &BotState,
    ctx: EventContext,
    args: &[String],
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let [raw_id] = args else {
        return Err(BotError::Validation("Usage: /delalert ALERT_ID".to_string()));
    };
    let id: u64 = raw_id
        .parse()
        .map_err(|_| BotError::Validation("❌ Invalid alert ID".to_string()))?;

    let removed = state.store.remove_alert(ctx.user_id, id).await;
    if removed {
        reply.reply(&format!("✅ Alert {id} deleted")).await
    } else {
        reply.reply(&format!("ℹ️ Alert {id} not found")).await
    }
}

pub async fn handle_callback(data: &str, reply: &dyn ReplyChannel) -> Result<(), BotError> {
    if let Some(raw) = data.strip_prefix("alert_set_") {
        let symbol = parse_symbol(raw)?;
        return reply
            .edit(
                &format!(
                    "To set an alert for {symbol}, use:\n\
                     /alert {symbol} TARGET_PRICE\n\
                     Example: /alert {symbol} 100.00"
                ),
                None,
            )
            .await;
    }

    Ok(())
}
