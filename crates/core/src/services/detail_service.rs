use log::debug;
use std::sync::Arc;

use crate::cache::DetailCache;
use crate::errors::CoreError;
use crate::models::detail::CoinDetail;
use crate::providers::traits::CoinSource;

/// "Show more info" lookups with a short-lived cache in front of the source.
pub struct DetailService {
    source: Arc<dyn CoinSource>,
    cache: DetailCache,
}

impl DetailService {
    pub fn new(source: Arc<dyn CoinSource>, cache: DetailCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &DetailCache {
        &self.cache
    }

    /// Cached record without touching the network.
    pub fn cached(&self, id: &str) -> Option<CoinDetail> {
        self.cache.get(id)
    }

    /// Cached record, or fetch and cache it.
    pub async fn get_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        if let Some(detail) = self.cache.get(id) {
            debug!("Detail cache hit for {id}");
            return Ok(detail);
        }

        let detail = self.source.fetch_coin_detail(id).await?;
        self.cache.put(detail.clone());
        Ok(detail)
    }
}
