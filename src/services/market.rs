use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{AccountDetails, AccountRef, MoverItem, Quote};

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("broker responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("BROKER_API_KEY is missing in .env")]
    MissingKey,
}

/// Market data / brokerage port.
///
/// The command handlers and the alert monitor depend on this trait only.
/// Production uses [`BrokerClient`]; tests inject an in-memory table.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// `Ok(None)` means the symbol does not exist; `Err` is a transient
    /// lookup failure worth retrying later.
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>, MarketError>;

    async fn get_movers(&self, index: &str) -> Result<Vec<MoverItem>, MarketError>;

    async fn get_accounts(&self) -> Result<Vec<AccountRef>, MarketError>;

    async fn get_account_details(
        &self,
        account_hash: &str,
        fields: Option<&str>,
    ) -> Result<AccountDetails, MarketError>;
}

#[derive(Clone)]
pub struct BrokerClient {
    http: Client,
    base_url: String,
    api_key: String,
}

// one slow symbol must not stall a whole monitor pass
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Quote payloads come keyed by symbol, usually with the numbers nested
// under a "quote" object, but some instrument types inline them.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuoteEntry {
    Nested { quote: Quote },
    Flat(Quote),
}

impl QuoteEntry {
    fn into_quote(self) -> Quote {
        match self {
            QuoteEntry::Nested { quote } => quote,
            QuoteEntry::Flat(quote) => quote,
        }
    }
}

#[derive(Deserialize)]
struct MoversResponse {
    #[serde(default)]
    screeners: Vec<MoverItem>,
}

impl BrokerClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, MarketError> {
        if !self.has_key() {
            return Err(MarketError::MissingKey);
        }

        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(MarketError::Status { status, body });
        }

        Ok(Some(res.json::<T>().await?))
    }
}

#[async_trait]
impl MarketData for BrokerClient {
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>, MarketError> {
        let Some(mut entries) = self
            .get_json::<HashMap<String, QuoteEntry>>(
                "/marketdata/v1/quotes",
                &[("symbols", symbol)],
            )
            .await?
        else {
            return Ok(None);
        };

        let Some(entry) = entries.remove(symbol) else {
            return Ok(None);
        };

        let mut quote = entry.into_quote();
        if quote.symbol.is_empty() {
            quote.symbol = symbol.to_string();
        }
        Ok(Some(quote))
    }

    async fn get_movers(&self, index: &str) -> Result<Vec<MoverItem>, MarketError> {
        let path = format!("/marketdata/v1/movers/{index}");
        let resp = self.get_json::<MoversResponse>(&path, &[]).await?;
        Ok(resp.map(|r| r.screeners).unwrap_or_default())
    }

    async fn get_accounts(&self) -> Result<Vec<AccountRef>, MarketError> {
        let resp = self
            .get_json::<Vec<AccountRef>>("/trader/v1/accounts/accountNumbers", &[])
            .await?;
        Ok(resp.unwrap_or_default())
    }

    async fn get_account_details(
        &self,
        account_hash: &str,
        fields: Option<&str>,
    ) -> Result<AccountDetails, MarketError> {
        let path = format!("/trader/v1/accounts/{account_hash}");
        let query: Vec<(&str, &str)> = match fields {
            Some(f) => vec![("fields", f)],
            None => vec![],
        };
        let resp = self.get_json::<AccountDetails>(&path, &query).await?;
        Ok(resp.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_entry_decodes_nested_shape() {
        let json = r#"{"quote": {"lastPrice": 101.5, "netChange": 1.25, "totalVolume": 900}}"#;
        let entry: QuoteEntry = serde_json::from_str(json).unwrap();
        let q = entry.into_quote();
        assert_eq!(q.last_price, 101.5);
        assert_eq!(q.net_change, 1.25);
        assert_eq!(q.total_volume, 900);
    }

    #[test]
    fn quote_entry_decodes_flat_shape() {
        let json = r#"{"lastPrice": 55.0, "bidPrice": 54.9, "askPrice": 55.1}"#;
        let entry: QuoteEntry = serde_json::from_str(json).unwrap();
        let q = entry.into_quote();
        assert_eq!(q.last_price, 55.0);
        assert_eq!(q.bid_price, 54.9);
    }

    #[test]
    fn missing_numeric_fields_decode_as_zero() {
        let entry: QuoteEntry = serde_json::from_str(r#"{"quote": {}}"#).unwrap();
        let q = entry.into_quote();
        assert_eq!(q.last_price, 0.0);
        assert_eq!(q.total_volume, 0);
        assert_eq!(q.ask_price, 0.0);
    }

    #[test]
    fn movers_response_tolerates_missing_screeners() {
        let resp: MoversResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.screeners.is_empty());
    }
}
