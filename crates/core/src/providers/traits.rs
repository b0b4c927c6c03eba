use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::coin::RawCoin;
use crate::models::detail::CoinDetail;

/// Source of the coin catalog and per-coin extended info.
///
/// The core depends only on this trait; swapping the upstream API means
/// writing one new implementation.
#[async_trait]
pub trait CoinSource: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the full, ordered coins list.
    async fn fetch_coin_list(&self) -> Result<Vec<RawCoin>, CoreError>;

    /// Fetch current prices and logo for one coin id.
    async fn fetch_coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError>;
}

/// Batch price feed used by the live report.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest price of every symbol in one request.
    ///
    /// The returned map is keyed by upper-cased symbol and only contains the
    /// symbols the upstream could resolve.
    async fn fetch_prices(
        &self,
        symbols: &[String],
        currency: &str,
    ) -> Result<HashMap<String, f64>, CoreError>;
}
