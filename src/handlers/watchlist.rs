use futures_util::future::join_all;

use crate::BotState;
use crate::error::BotError;
use crate::handlers::parse_symbol;
use crate::router::{EventContext, ReplyChannel};
use crate::telegram::{InlineButton, InlineKeyboard};

// display cap keeps one view from fanning out into dozens of lookups
const MAX_DISPLAYED: usize = 10;

const EMPTY_TEXT: &str = "👀 Your watchlist is empty\nUse /addwatch SYMBOL to add stocks";

pub async fn show(
    state: &BotState,
    ctx: EventContext,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let symbols = state.store.with_user(ctx.user_id, |u| u.watchlist.clone()).await;

    if symbols.is_empty() {
        return reply.reply(EMPTY_TEXT).await;
    }

    reply
        .reply_with_keyboard(&render(state, &symbols).await, watchlist_keyboard())
        .await
}

pub async fn add(
    state: &BotState,
    ctx: EventContext,
    args: &[String],
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let [raw] = args else {
        return Err(BotError::Validation(
            "Usage: /addwatch SYMBOL\nExample: /addwatch AAPL".to_string(),
        ));
    };
    let symbol = parse_symbol(raw)?;

    // never add a symbol the broker can't resolve
    if state.market.get_quote(&symbol).await?.is_none() {
        return Err(BotError::NotFound(format!("❌ Could not find symbol {symbol}")));
    }

    let added = state.store.with_user(ctx.user_id, |u| u.add_watch(&symbol)).await;
    if added {
        reply.reply(&format!("✅ Added {symbol} to your watchlist")).await
    } else {
        reply
            .reply(&format!("ℹ️ {symbol} is already in your watchlist"))
            .await
    }
}

pub async fn remove(
    state: &BotState,
    ctx: EventContext,
    args: &[String],
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let [raw] = args else {
        return Err(BotError::Validation(
            "Usage: /delwatch SYMBOL\nExample: /delwatch AAPL".to_string(),
        ));
    };
    let symbol = parse_symbol(raw)?;

    let removed = state
        .store
        .with_user(ctx.user_id, |u| u.remove_watch(&symbol))
        .await;
    if removed {
        reply
            .reply(&format!("✅ Removed {symbol} from your watchlist"))
            .await
    } else {
        reply.reply(&format!("ℹ️ {symbol} is not in your watchlist")).await
    }
}

pub async fn handle_callback(
    state: &BotState,
    ctx: EventContext,
    data: &str,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    if data == "watch_refresh" {
        let symbols = state.store.with_user(ctx.user_id, |u| u.watchlist.clone()).await;
        if symbols.is_empty() {
            return reply.edit(EMPTY_TEXT, None).await;
        }
        return reply
            .edit(&render(state, &symbols).await, Some(watchlist_keyboard()))
            .await;
    }

    if data == "watch_add_prompt" {
        return reply
            .edit("Use /addwatch SYMBOL to add a stock.\nExample: /addwatch AAPL", None)
            .await;
    }

    // keep this after the watch_add_prompt check: both share the prefix
    if let Some(raw) = data.strip_prefix("watch_add_") {
        let symbol = parse_symbol(raw)?;
        let added = state.store.with_user(ctx.user_id, |u| u.add_watch(&symbol)).await;
        let text = if added {
            format!("✅ Added {symbol} to your watchlist")
        } else {
            format!("ℹ️ {symbol} is already in your watchlist")
        };
        return reply.edit(&text, None).await;
    }

    Ok(())
}

async fn render(state: &BotState, symbols: &[String]) -> String {
    let shown = &symbols[..symbols.len().min(MAX_DISPLAYED)];
    let quotes = join_all(shown.iter().map(|s| state.market.get_quote(s))).await;

    let mut msg = String::from("👀 Your Watchlist\n\n");
    for (symbol, quote) in shown.iter().zip(quotes) {
        match quote {
            Ok(Some(q)) => {
                let arrow = if q.net_change >= 0.0 { "📈" } else { "📉" };
                msg.push_str(&format!(
                    "{arrow} {symbol}: ${:.2} ({:+.2}%)\n",
                    q.last_price, q.net_percent_change
                ));
            }
            Ok(None) => {
                msg.push_str(&format!("❓ {symbol}: quote unavailable\n"));
            }
            Err(e) => {
                // one dead symbol shouldn't blank the whole view
                tracing::warn!(symbol = %symbol, error = %e, "watchlist quote failed");
                msg.push_str(&format!("❓ {symbol}: quote unavailable\n"));
            }
        }
    }
    msg
}

fn watchlist_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![
        InlineButton::new("🔄 Refresh", "watch_refresh"),
        InlineButton::new("➕ Add Stock", "watch_add_prompt"),
    ]])
}
