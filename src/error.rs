use thiserror::Error;

use crate::services::market::MarketError;

/// Errors a command or callback handler can surface.
///
/// The router converts every variant into a user-visible reply; nothing
/// propagates past a single dispatch or a single monitor pass.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("not authorized")]
    Unauthorized,

    // malformed arguments; message is shown to the user as-is
    #[error("{0}")]
    Validation(String),

    // absent symbol/alert/id; informational, not a fault
    #[error("{0}")]
    NotFound(String),

    #[error("market data error: {0}")]
    Market(#[from] MarketError),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("internal error: {0}")]
    Internal(String),
}
