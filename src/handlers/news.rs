use crate::error::BotError;
use crate::handlers::parse_symbol;
use crate::router::ReplyChannel;

/// No news provider is wired up; the command documents that instead of
/// failing.
pub async fn news(args: &[String], reply: &dyn ReplyChannel) -> Result<(), BotError> {
    let [raw] = args else {
        return Err(BotError::Validation(
            "Usage: /news SYMBOL\nExample: /news AAPL".to_string(),
        ));
    };
    let symbol = parse_symbol(raw)?;

    reply
        .reply(&format!(
            "📰 News for {symbol}\n\n\
             🔍 News integration requires an additional data provider.\n\
             For now, search for {symbol} news manually."
        ))
        .await
}
