use crate::BotState;
use crate::error::BotError;
use crate::handlers::parse_symbol;
use crate::models::Quote;
use crate::router::ReplyChannel;
use crate::telegram::{InlineButton, InlineKeyboard};

pub async fn quote(
    state: &BotState,
    args: &[String],
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    let [raw] = args else {
        return Err(BotError::Validation(
            "📈 Usage: /quote SYMBOL\nExample: /quote AAPL".to_string(),
        ));
    };
    let symbol = parse_symbol(raw)?;

    let Some(quote) = state.market.get_quote(&symbol).await? else {
        return Err(BotError::NotFound(format!(
            "❌ Could not find a quote for {symbol}.\nCheck the spelling and that the symbol is listed."
        )));
    };

    reply
        .reply_with_keyboard(&format_quote(&symbol, &quote), quote_keyboard(&symbol))
        .await
}

pub async fn handle_callback(
    state: &BotState,
    data: &str,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    if let Some(raw) = data.strip_prefix("quote_refresh_") {
        let symbol = parse_symbol(raw)?;

        let Some(quote) = state.market.get_quote(&symbol).await? else {
            return Err(BotError::NotFound(format!(
                "❌ Could not refresh the quote for {symbol}."
            )));
        };

        let mut text = format_quote(&symbol, &quote);
        text.push_str("\n🔄 Updated");
        return reply.edit(&text, Some(quote_keyboard(&symbol))).await;
    }

    Ok(())
}

fn trend(change: f64) -> (&'static str, &'static str) {
    if change > 0.0 {
        ("📈", "🟢")
    } else if change < 0.0 {
        ("📉", "🔴")
    } else {
        ("➖", "🔵")
    }
}

fn format_quote(symbol: &str, q: &Quote) -> String {
    let (arrow, dot) = trend(q.net_change);

    let mut msg = format!(
        "{arrow} {symbol} {dot}\n\n\
         💰 Price: ${:.2}\n\
         📊 Change: {:+.2} ({:+.2}%)\n\
         📊 Volume: {}\n\
         📺 High: ${:.2}\n\
         📻 Low: ${:.2}\n",
        q.last_price, q.net_change, q.net_percent_change, q.total_volume, q.high_price, q.low_price
    );

    // bid/ask only when the feed actually has a book for the symbol
    if q.bid_price > 0.0 && q.ask_price > 0.0 {
        msg.push_str(&format!(
            "💵 Bid/Ask: ${:.2} / ${:.2}\n",
            q.bid_price, q.ask_price
        ));
    }

    msg
}

/// Secondary actions ride along as callback tokens; nothing here invokes
/// them directly.
fn quote_keyboard(symbol: &str) -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![
            InlineButton::new("📈 Buy", format!("order_buy_{symbol}")),
            InlineButton::new("📉 Sell", format!("order_sell_{symbol}")),
        ],
        vec![
            InlineButton::new("➕ Add to Watchlist", format!("watch_add_{symbol}")),
            InlineButton::new("🔔 Set Alert", format!("alert_set_{symbol}")),
        ],
        vec![InlineButton::new(
            "🔄 Refresh",
            format!("quote_refresh_{symbol}"),
        )],
    ])
}
