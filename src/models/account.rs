use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountRef {
    pub hash_value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountBalances {
    pub liquidation_value: f64,
    pub cash_balance: f64,
    pub buying_power: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerPosition {
    pub instrument: Instrument,
    pub long_quantity: f64,
    pub short_quantity: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountDetails {
    pub current_balances: AccountBalances,
    pub positions: Vec<BrokerPosition>,
}
