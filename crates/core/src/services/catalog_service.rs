use log::info;
use std::sync::Arc;

use crate::cache::CatalogCache;
use crate::errors::CoreError;
use crate::providers::traits::CoinSource;

/// Loads the catalog window from the coin source.
pub struct CatalogService {
    source: Arc<dyn CoinSource>,
    offset: usize,
    window: usize,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CoinSource>, offset: usize, window: usize) -> Self {
        Self {
            source,
            offset,
            window,
        }
    }

    /// Fetch the full list and replace `cache` with the selected window.
    ///
    /// On failure the cache keeps its previous contents.
    pub async fn load(&self, cache: &mut CatalogCache) -> Result<usize, CoreError> {
        let raw = self.source.fetch_coin_list().await?;
        let loaded = cache.load(&raw, self.offset, self.window).len();
        info!(
            "Catalog loaded from {}: {loaded} coins (window {} at offset {}, {} upstream)",
            self.source.name(),
            self.window,
            self.offset,
            raw.len()
        );
        Ok(loaded)
    }
}
