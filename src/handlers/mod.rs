use std::sync::OnceLock;

use regex::Regex;

use crate::error::BotError;

pub mod alerts;
pub mod base;
pub mod movers;
pub mod news;
pub mod orders;
pub mod portfolio;
pub mod quotes;
pub mod watchlist;

/// Uppercases and shape-checks a user-supplied ticker before it reaches
/// the broker or a callback token.
pub(crate) fn parse_symbol(raw: &str) -> Result<String, BotError> {
    static TICKER_RE: OnceLock<Regex> = OnceLock::new();
    let re = TICKER_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9./$-]{0,9}$").unwrap());

    let symbol = raw.trim().to_uppercase();
    if re.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(BotError::Validation(format!(
            "❌ \"{raw}\" doesn't look like a ticker symbol."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_tickers() {
        assert_eq!(parse_symbol("aapl").unwrap(), "AAPL");
        assert_eq!(parse_symbol(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(parse_symbol("spy").unwrap(), "SPY");
    }

    #[test]
    fn rejects_junk() {
        assert!(parse_symbol("").is_err());
        assert!(parse_symbol("no spaces").is_err());
        assert!(parse_symbol("order_confirm_x").is_err());
        assert!(parse_symbol("AVERYLONGSYMBOLNAME").is_err());
    }
}
