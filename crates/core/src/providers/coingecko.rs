use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::CoinSource;
use crate::errors::CoreError;
use crate::models::coin::RawCoin;
use crate::models::detail::CoinDetail;
use crate::models::settings::Settings;

const PROVIDER: &str = "CoinGecko";

/// CoinGecko API provider for the coin catalog and "more info" details.
///
/// - **Free**: No API key required (public endpoints are rate limited).
/// - **Endpoints**: `/coins/list`, `/coins/{id}`
pub struct CoinGeckoProvider {
    client: Client,
    list_url: String,
    detail_url: String,
}

impl CoinGeckoProvider {
    pub fn new(list_url: impl Into<String>, detail_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            list_url: list_url.into(),
            detail_url: detail_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.coin_list_url.clone(),
            settings.coin_detail_url.clone(),
            settings.request_timeout(),
        )
    }

    /// URL of the detail endpoint for one coin.
    pub fn detail_endpoint(&self, id: &str) -> String {
        format!("{}/{}", self.detail_url, id)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct CoinDetailResponse {
    id: String,
    #[serde(default)]
    market_data: Option<MarketData>,
    #[serde(default)]
    image: Option<ImageLinks>,
}

#[derive(Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: CurrentPrice,
}

#[derive(Deserialize, Default)]
struct CurrentPrice {
    usd: Option<f64>,
    eur: Option<f64>,
    ils: Option<f64>,
}

#[derive(Deserialize)]
struct ImageLinks {
    #[serde(default)]
    small: String,
}

impl From<CoinDetailResponse> for CoinDetail {
    fn from(resp: CoinDetailResponse) -> Self {
        let prices = resp
            .market_data
            .map(|m| m.current_price)
            .unwrap_or_default();
        let logo = resp.image.map(|i| i.small).unwrap_or_default();
        CoinDetail::from_quotes(resp.id, prices.usd, prices.eur, prices.ils, logo)
    }
}

/// Map a raw `/coins/{id}` body into a `CoinDetail`.
pub fn parse_coin_detail(body: &str) -> Result<CoinDetail, CoreError> {
    let resp: CoinDetailResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse coin detail: {e}"),
    })?;
    Ok(resp.into())
}

#[async_trait]
impl CoinSource for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_coin_list(&self) -> Result<Vec<RawCoin>, CoreError> {
        let coins: Vec<RawCoin> = self
            .client
            .get(&self.list_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse coins list: {e}"),
            })?;

        debug!("{PROVIDER}: fetched {} coins", coins.len());
        Ok(coins)
    }

    async fn fetch_coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        let url = self.detail_endpoint(id);
        let resp: CoinDetailResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse detail for {id}: {e}"),
            })?;

        Ok(resp.into())
    }
}
