use std::cmp::Ordering;

use crate::BotState;
use crate::error::BotError;
use crate::models::MoverItem;
use crate::router::ReplyChannel;

const DEFAULT_INDEX: &str = "SPX";
const TOP_N: usize = 5;

pub async fn movers(
    state: &BotState,
    args: &[String],
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    if args.len() > 1 {
        return Err(BotError::Validation(
            "Usage: /movers [INDEX]\nExample: /movers SPX".to_string(),
        ));
    }

    let raw = args
        .first()
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| DEFAULT_INDEX.to_string());

    // the movers endpoint wants $-prefixed index symbols
    let index = if raw.starts_with('$') {
        raw
    } else {
        format!("${raw}")
    };

    let mut items = state.market.get_movers(&index).await?;
    if items.is_empty() {
        return Err(BotError::NotFound(format!("❌ No movers found for {index}")));
    }

    let mut msg = String::from("📊 Market Movers\n\n📈 Top Movers by Percent Change:\n");
    items.sort_by(|a, b| {
        pct(b)
            .abs()
            .partial_cmp(&pct(a).abs())
            .unwrap_or(Ordering::Equal)
    });
    for (i, m) in items.iter().take(TOP_N).enumerate() {
        msg.push_str(&format!(
            "{}. {} - {} (${:.2}, {:+.2}%)\n",
            i + 1,
            m.symbol,
            m.description,
            m.last_price,
            pct(m)
        ));
    }

    msg.push_str("\n💰 Top Movers by Volume:\n");
    items.sort_by(|a, b| b.volume.cmp(&a.volume));
    for (i, m) in items.iter().take(TOP_N).enumerate() {
        msg.push_str(&format!(
            "{}. {} - {} (${:.2}, Volume: {})\n",
            i + 1,
            m.symbol,
            m.description,
            m.last_price,
            m.volume
        ));
    }

    reply.reply(&msg).await
}

// wire value is a decimal fraction
fn pct(m: &MoverItem) -> f64 {
    m.net_percent_change * 100.0
}

/// `/gainers` and `/losers` survive only as redirects.
pub async fn deprecated(reply: &dyn ReplyChannel) -> Result<(), BotError> {
    reply
        .reply("This command is no longer supported. Use /movers instead.")
        .await
}
