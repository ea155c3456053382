#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderAction::Buy => "BUY",
            OrderAction::Sell => "SELL",
        }
    }
}

/// Unconfirmed order awaiting the user's confirm/cancel press.
///
/// At most one exists per user; a newer /buy or /sell overwrites it. The
/// confirm/cancel buttons carry only `session`, so a stale prompt can be
/// told apart from the one currently on file.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub session: String,

    pub symbol: String,
    pub shares: i64,
    pub action: OrderAction,

    // last price at the time the prompt was shown
    pub reference_price: f64,

    pub chat_id: i64,
}
