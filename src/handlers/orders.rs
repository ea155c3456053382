use uuid::Uuid;

use crate::BotState;
use crate::error::BotError;
use crate::handlers::parse_symbol;
use crate::models::{OrderAction, PendingOrder};
use crate::router::{EventContext, ReplyChannel};
use crate::telegram::{InlineButton, InlineKeyboard};

pub async fn order_menu(reply: &dyn ReplyChannel) -> Result<(), BotError> {
    let keyboard = InlineKeyboard::new(vec![vec![
        InlineButton::new("📈 Buy Order", "order_type_buy"),
        InlineButton::new("📉 Sell Order", "order_type_sell"),
    ]]);
    reply.reply_with_keyboard("🔧 Select order type:", keyboard).await
}

/// `/buy SYMBOL SHARES` and `/sell SYMBOL SHARES`.
///
/// A successful quote lookup moves the user's order state machine to
/// awaiting-confirmation; the prompt's buttons carry only a fresh session
/// id, so confirm/cancel always resolve against what is stored here.
pub async fn quick_order(
    state: &BotState,
    ctx: EventContext,
    args: &[String],
    action: OrderAction,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let verb = match action {
        OrderAction::Buy => "buy",
        OrderAction::Sell => "sell",
    };

    let [raw_symbol, raw_shares] = args else {
        return Err(BotError::Validation(format!(
            "Usage: /{verb} SYMBOL SHARES\nExample: /{verb} AAPL 10"
        )));
    };
    let symbol = parse_symbol(raw_symbol)?;
    let shares: i64 = raw_shares
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            BotError::Validation("❌ Shares must be a positive whole number.".to_string())
        })?;

    // lookup failure leaves the state machine at NONE
    let Some(quote) = state.market.get_quote(&symbol).await? else {
        return Err(BotError::NotFound(format!(
            "❌ Could not get a quote for {symbol}."
        )));
    };

    let price = quote.last_price;
    let estimated = price * shares as f64;

    let order = PendingOrder {
        session: Uuid::new_v4().to_string(),
        symbol: symbol.clone(),
        shares,
        action,
        reference_price: price,
        chat_id: ctx.chat_id,
    };
    let session = order.session.clone();

    state
        .store
        .with_user(ctx.user_id, |u| u.set_pending_order(order))
        .await;

    let cost_label = match action {
        OrderAction::Buy => "Cost",
        OrderAction::Sell => "Proceeds",
    };
    let text = format!(
        "🔧 Order Confirmation\n\n\
         Symbol: {symbol}\n\
         Action: {}\n\
         Shares: {shares}\n\
         Current Price: ${price:.2}\n\
         Estimated {cost_label}: ${estimated:.2}\n\n\
         ⚠️ This is a market order that will execute immediately.",
        action.as_str()
    );
    let keyboard = InlineKeyboard::new(vec![vec![
        InlineButton::new("✅ Confirm", format!("order_confirm_{session}")),
        InlineButton::new("❌ Cancel", format!("order_cancel_{session}")),
    ]]);

    reply.reply_with_keyboard(&text, keyboard).await
}

pub async fn recent_orders(state: &BotState, reply: &dyn ReplyChannel) -> Result<(), BotError> {
    let accounts = state.market.get_accounts().await?;
    if accounts.is_empty() {
        return Err(BotError::NotFound("❌ No linked accounts found.".to_string()));
    }

    // the simulated flow keeps no order history
    reply.reply("📋 Recent Orders\n\nNo recent orders found.").await
}

pub async fn handle_callback(
    state: &BotState,
    ctx: EventContext,
    data: &str,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    if let Some(session) = data.strip_prefix("order_confirm_") {
        let taken = state
            .store
            .with_user(ctx.user_id, |u| u.take_pending_order(session))
            .await;

        let Some(order) = taken else {
            return reply
                .edit(
                    "⌛ That order prompt has expired. Start again with /buy or /sell.",
                    None,
                )
                .await;
        };

        tracing::info!(
            user_id = ctx.user_id,
            symbol = %order.symbol,
            shares = order.shares,
            action = order.action.as_str(),
            "simulated order submitted"
        );

        let text = format!(
            "✅ Order Submitted\n\n\
             Symbol: {}\n\
             Action: {}\n\
             Shares: {}\n\n\
             ⚠️ Demo mode: this is a simulation, no real order was placed.",
            order.symbol,
            order.action.as_str(),
            order.shares
        );
        return reply.edit(&text, None).await;
    }

    if let Some(session) = data.strip_prefix("order_cancel_") {
        let taken = state
            .store
            .with_user(ctx.user_id, |u| u.take_pending_order(session))
            .await;

        return match taken {
            Some(_) => reply.edit("❌ Order cancelled.", None).await,
            None => reply.edit("⌛ That order prompt has expired.", None).await,
        };
    }

    if data == "order_type_buy" || data == "order_type_sell" {
        let verb = if data.ends_with("buy") { "buy" } else { "sell" };
        return reply
            .edit(
                &format!(
                    "Use /{verb} SYMBOL SHARES to place a {verb} order.\nExample: /{verb} AAPL 10"
                ),
                None,
            )
            .await;
    }

    // quote-card shortcut buttons point back at the commands
    if let Some(symbol) = data.strip_prefix("order_buy_") {
        return reply
            .edit(
                &format!("To buy {symbol}, use:\n/buy {symbol} SHARES\nExample: /buy {symbol} 10"),
                None,
            )
            .await;
    }
    if let Some(symbol) = data.strip_prefix("order_sell_") {
        return reply
            .edit(
                &format!(
                    "To sell {symbol}, use:\n/sell {symbol} SHARES\nExample: /sell {symbol} 10"
                ),
                None,
            )
            .await;
    }

    Ok(())
}
