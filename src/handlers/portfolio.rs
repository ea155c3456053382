use crate::BotState;
use crate::error::BotError;
use crate::models::AccountDetails;
use crate::router::ReplyChannel;
use crate::telegram::{InlineButton, InlineKeyboard};

const MAX_POSITIONS: usize = 10;

/// `/portfolio` and `/balance` both show the balance summary.
pub async fn summary(state: &BotState, reply: &dyn ReplyChannel) -> Result<(), BotError> {
    let details = primary_account(state).await?;
    let b = &details.current_balances;

    let text = format!(
        "💼 Portfolio Summary\n\n\
         💰 Total Value: ${:.2}\n\
         💵 Cash: ${:.2}\n\
         🔋 Buying Power: ${:.2}",
        b.liquidation_value, b.cash_balance, b.buying_power
    );
    let keyboard = InlineKeyboard::new(vec![vec![
        InlineButton::new("📊 Positions", "portfolio_positions"),
        InlineButton::new("📈 Performance", "portfolio_performance"),
    ]]);

    reply.reply_with_keyboard(&text, keyboard).await
}

pub async fn positions(state: &BotState, reply: &dyn ReplyChannel) -> Result<(), BotError> {
    let details = primary_account(state).await?;
    reply.reply(&positions_text(&details)).await
}

pub async fn handle_callback(
    state: &BotState,
    data: &str,
    reply: &dyn ReplyChannel,
) -> Result<(), BotError> {
    match data {
        "portfolio_positions" => {
            let details = primary_account(state).await?;
            reply.edit(&positions_text(&details), None).await
        }
        "portfolio_performance" => {
            reply
                .edit("📈 Performance reporting is not available yet.", None)
                .await
        }
        _ => Ok(()),
    }
}

/// The bot always works against the first linked account.
async fn primary_account(state: &BotState) -> Result<AccountDetails, BotError> {
    let accounts = state.market.get_accounts().await?;
    let Some(first) = accounts.first() else {
        return Err(BotError::NotFound("❌ No linked accounts found".to_string()));
    };
    Ok(state
        .market
        .get_account_details(&first.hash_value, Some("positions"))
        .await?)
}

fn positions_text(details: &AccountDetails) -> String {
    let mut lines = Vec::new();
    for p in details.positions.iter().take(MAX_POSITIONS) {
        let qty = p.long_quantity - p.short_quantity;
        if qty != 0.0 {
            lines.push(format!(
                "• {}: {} shares (${:.2})",
                p.instrument.symbol, qty, p.market_value
            ));
        }
    }

    if lines.is_empty() {
        "📊 No positions found".to_string()
    } else {
        format!("📊 Current Positions\n\n{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrokerPosition, Instrument};

    fn pos(symbol: &str, long: f64, short: f64, value: f64) -> BrokerPosition {
        BrokerPosition {
            instrument: Instrument {
                symbol: symbol.to_string(),
            },
            long_quantity: long,
            short_quantity: short,
            market_value: value,
        }
    }

    #[test]
    fn flat_positions_are_hidden() {
        let details = AccountDetails {
            positions: vec![pos("AAPL", 10.0, 0.0, 1500.0), pos("XYZ", 5.0, 5.0, 0.0)],
            ..Default::default()
        };
        let text = positions_text(&details);
        assert!(text.contains("AAPL"));
        assert!(!text.contains("XYZ"));
    }

    #[test]
    fn empty_account_reads_as_no_positions() {
        let text = positions_text(&AccountDetails::default());
        assert_eq!(text, "📊 No positions found");
    }
}
