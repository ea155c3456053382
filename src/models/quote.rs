use serde::{Deserialize, Serialize};

/// Snapshot quote for one symbol. Fetched fresh on every use, never stored.
///
/// The broker omits fields it has no data for, so everything defaults to
/// zero on decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,

    pub last_price: f64,
    pub net_change: f64,
    #[serde(rename = "netPercentChangeInDouble")]
    pub net_percent_change: f64,

    pub total_volume: i64,

    pub high_price: f64,
    pub low_price: f64,
    pub bid_price: f64,
    pub ask_price: f64,
}

/// One screener row from the movers endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MoverItem {
    pub symbol: String,
    pub description: String,
    pub last_price: f64,
    pub net_change: f64,

    // decimal fraction on the wire (0.012 = 1.2%)
    pub net_percent_change: f64,

    pub volume: i64,
    pub trades: i64,
    pub market_share: f64,
}
