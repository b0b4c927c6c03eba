use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::PriceFeed;
use crate::errors::CoreError;
use crate::models::settings::Settings;

const PROVIDER: &str = "CryptoCompare";

/// CryptoCompare `pricemulti` provider for the live report.
///
/// - **Free**: No API key required for low request rates.
/// - **Lookup**: by symbol only; ids are not understood, so coins sharing a
///   symbol cannot be told apart and some symbols never resolve.
pub struct CryptoCompareProvider {
    client: Client,
    price_url: String,
}

impl CryptoCompareProvider {
    pub fn new(price_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            price_url: price_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.price_url.clone(), settings.request_timeout())
    }

    /// Query parameters for one batch request, unencoded.
    pub fn query_params(symbols: &[String], currency: &str) -> [(&'static str, String); 2] {
        [
            ("fsyms", join_symbols(symbols)),
            ("tsyms", currency.to_uppercase()),
        ]
    }

    /// Full request URL for a batch of symbols, with the query encoded.
    pub fn request_url(&self, symbols: &[String], currency: &str) -> Result<Url, CoreError> {
        Url::parse_with_params(&self.price_url, Self::query_params(symbols, currency)).map_err(
            |e| CoreError::Configuration(format!("Invalid price URL {}: {e}", self.price_url)),
        )
    }
}

impl Default for CryptoCompareProvider {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Comma-join symbols in order, upper-cased.
pub fn join_symbols(symbols: &[String]) -> String {
    symbols
        .iter()
        .map(|s| s.to_uppercase())
        .collect::<Vec<_>>()
        .join(",")
}

/// Map a `pricemulti` body (`{"BTC":{"USD":1.0},...}`) into symbol → price.
///
/// An error envelope (`{"Response":"Error",...}`) means nothing resolved.
/// Entries without a numeric quote in `currency` are left out.
pub fn parse_price_response(body: &Value, currency: &str) -> HashMap<String, f64> {
    let mut prices = HashMap::new();
    let Some(map) = body.as_object() else {
        return prices;
    };

    if map.get("Response").and_then(Value::as_str) == Some("Error") {
        let message = map.get("Message").and_then(Value::as_str).unwrap_or("");
        warn!("{PROVIDER}: no symbol resolved ({message})");
        return prices;
    }

    let wanted = currency.to_uppercase();
    for (symbol, quotes) in map {
        let price = quotes.as_object().and_then(|q| {
            q.iter()
                .find(|(cur, _)| cur.to_uppercase() == wanted)
                .and_then(|(_, v)| v.as_f64())
        });
        if let Some(price) = price {
            prices.insert(symbol.to_uppercase(), price);
        }
    }
    prices
}

#[async_trait]
impl PriceFeed for CryptoCompareProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_prices(
        &self,
        symbols: &[String],
        currency: &str,
    ) -> Result<HashMap<String, f64>, CoreError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let body: Value = self
            .client
            .get(&self.price_url)
            .query(&Self::query_params(symbols, currency))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse prices: {e}"),
            })?;

        let prices = parse_price_response(&body, currency);
        debug!(
            "{PROVIDER}: resolved {}/{} symbols",
            prices.len(),
            symbols.len()
        );
        Ok(prices)
    }
}
