pub mod cache;
pub mod errors;
pub mod models;
pub mod pins;
pub mod presentation;
pub mod providers;
pub mod scheduler;
pub mod services;
pub mod storage;

use log::{info, warn};
use std::sync::Arc;

use cache::{CatalogCache, DetailCache};
use errors::CoreError;
use models::{
    coin::Coin,
    detail::CoinDetail,
    pin::{ReplaceOutcome, ToggleOutcome},
    settings::Settings,
};
use pins::{PinSetManager, PinToggle};
use presentation::{Presenter, Region, UserMessage};
use providers::{
    coingecko::CoinGeckoProvider,
    cryptocompare::CryptoCompareProvider,
    traits::{CoinSource, PriceFeed},
};
use scheduler::{Scheduler, TokioScheduler};
use services::{
    catalog_service::CatalogService,
    detail_service::DetailService,
    live_report::{LivePollEngine, LiveReportHandle},
};
use storage::KeyValueStore;

/// Outcome of a catalog (re)load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLoad {
    /// Number of coins now in the catalog
    pub coins: usize,
    /// Pinned ids removed because the new catalog no longer lists them
    pub pruned: Vec<String>,
}

/// Main entry point for the Coin Watch core library.
///
/// Holds the catalog, the detail cache and the pin manager, and turns every
/// failure into a message on the presenter before handing it back.
#[must_use]
pub struct CoinWatch {
    settings: Settings,
    catalog: CatalogCache,
    catalog_service: CatalogService,
    detail_service: DetailService,
    pins: Arc<PinSetManager>,
    engine: LivePollEngine,
    presenter: Arc<dyn Presenter>,
}

impl std::fmt::Debug for CoinWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinWatch")
            .field("catalog", &self.catalog.len())
            .field("cached_details", &self.detail_service.cache().len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl CoinWatch {
    /// Build with explicit providers (tests, alternative upstreams).
    pub fn new(
        settings: Settings,
        source: Arc<dyn CoinSource>,
        feed: Arc<dyn PriceFeed>,
        store: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, CoreError> {
        Self::with_scheduler(settings, source, feed, store, presenter, Arc::new(TokioScheduler))
    }

    /// Build against CoinGecko and CryptoCompare as configured in `settings`.
    pub fn with_default_providers(
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, CoreError> {
        let source = Arc::new(CoinGeckoProvider::from_settings(&settings));
        let feed = Arc::new(CryptoCompareProvider::from_settings(&settings));
        Self::new(settings, source, feed, store, presenter)
    }

    /// Build with a custom scheduler for detail-cache eviction.
    pub fn with_scheduler(
        settings: Settings,
        source: Arc<dyn CoinSource>,
        feed: Arc<dyn PriceFeed>,
        store: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn Presenter>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;

        let catalog_service = CatalogService::new(
            Arc::clone(&source),
            settings.catalog_offset,
            settings.catalog_window,
        );
        let detail_service = DetailService::new(
            source,
            DetailCache::new(settings.detail_ttl(), scheduler),
        );
        let pins = Arc::new(PinSetManager::from_settings(store, &settings));
        let engine = LivePollEngine::from_settings(feed, Arc::clone(&presenter), &settings);

        Ok(Self {
            settings,
            catalog: CatalogCache::new(),
            catalog_service,
            detail_service,
            pins,
            engine,
            presenter,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Shared pin manager, for surfaces that outlive a borrow of `self`.
    pub fn pins(&self) -> Arc<PinSetManager> {
        Arc::clone(&self.pins)
    }

    pub fn detail_cache(&self) -> &DetailCache {
        self.detail_service.cache()
    }

    fn report(&self, region: &Region, err: &CoreError) {
        self.presenter
            .show_message(region, &UserMessage::from_error(err));
    }

    /// Show a failed result's error in `region` and pass the result on.
    fn reported<T>(&self, region: &Region, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e) = &result {
            warn!("{e}");
            self.report(region, e);
        }
        result
    }

    // ── Catalog ─────────────────────────────────────────────────────

    /// Fetch the coins list, render the catalog window, and drop pinned coins
    /// the new catalog no longer lists (telling the user once if any were).
    pub async fn refresh_catalog(&mut self) -> Result<CatalogLoad, CoreError> {
        self.presenter.show_loading(&Region::Main);
        let loaded = self.catalog_service.load(&mut self.catalog).await;
        self.presenter.hide_loading(&Region::Main);

        let coins = match loaded {
            Ok(coins) => coins,
            Err(e) => {
                warn!("Catalog load failed: {e}");
                self.report(&Region::Main, &e);
                return Err(e);
            }
        };
        self.presenter.render_coins(self.catalog.coins());

        let pruned = self.reported(&Region::Main, self.pins.prune_missing(&self.catalog))?;
        if !pruned.is_empty() {
            let stale = CoreError::StaleReference {
                removed: pruned.clone(),
            };
            self.report(&Region::Modal, &stale);
        }

        Ok(CatalogLoad { coins, pruned })
    }

    /// Show the catalog, loading it first if nothing is cached yet.
    pub async fn home(&mut self) -> Result<(), CoreError> {
        if self.catalog.is_empty() {
            self.refresh_catalog().await?;
        } else {
            self.presenter.render_coins(self.catalog.coins());
        }
        Ok(())
    }

    /// Find a coin by symbol and render it alone.
    pub fn search(&self, query: &str) -> Result<Coin, CoreError> {
        match self.catalog.search(query) {
            Ok(coin) => {
                self.presenter.render_coins(std::slice::from_ref(coin));
                Ok(coin.clone())
            }
            Err(e) => {
                self.report(&Region::Modal, &e);
                Err(e)
            }
        }
    }

    // ── Details ─────────────────────────────────────────────────────

    /// Show prices and logo for one coin, from cache when fresh.
    pub async fn show_more_info(&self, id: &str) -> Result<CoinDetail, CoreError> {
        if let Some(detail) = self.detail_service.cached(id) {
            self.presenter.render_detail(&detail);
            return Ok(detail);
        }

        let region = Region::Coin(id.to_string());
        self.presenter.show_loading(&region);
        let fetched = self.detail_service.get_detail(id).await;
        self.presenter.hide_loading(&region);

        match fetched {
            Ok(detail) => {
                self.presenter.render_detail(&detail);
                Ok(detail)
            }
            Err(e) => {
                self.report(&region, &e);
                Err(e)
            }
        }
    }

    // ── Pinned coins ────────────────────────────────────────────────

    /// Apply a toggle click. A full set opens the overflow prompt.
    pub fn toggle_pin(&self, id: &str, checked: bool) -> Result<ToggleOutcome, CoreError> {
        let outcome = self.reported(&Region::Modal, self.pins.set_pinned(id, checked))?;
        if let ToggleOutcome::Overflow(prompt) = &outcome {
            self.presenter.show_overflow(prompt);
        }
        Ok(outcome)
    }

    /// Resolve the overflow prompt by unpinning `evict` in favour of `candidate`.
    pub fn resolve_overflow(
        &self,
        evict: &str,
        candidate: &str,
    ) -> Result<ReplaceOutcome, CoreError> {
        self.reported(&Region::Modal, self.pins.replace(evict, candidate))
    }

    /// Observer for a toggle rendered for `id`.
    pub fn pin_toggle(&self, id: &str) -> Result<PinToggle, CoreError> {
        self.reported(&Region::Main, self.pins.toggle(id))
    }

    /// Show the pinned coins, or an explicit "nothing pinned" message.
    pub fn view_pinned(&self) -> Result<Vec<String>, CoreError> {
        let ids = self.reported(&Region::Modal, self.pins.list())?;
        if ids.is_empty() {
            self.presenter.show_message(
                &Region::Modal,
                &UserMessage::new(
                    "Checked Coins List: ",
                    format!(
                        "No coins were selected! You may go back and select up to {} coins",
                        self.pins.capacity()
                    ),
                ),
            );
        } else {
            self.presenter.show_pinned(&ids);
        }
        Ok(ids)
    }

    // ── Live report ─────────────────────────────────────────────────

    /// Start the live chart for the pinned coins.
    ///
    /// Pinned ids that are not in the catalog are skipped.
    pub fn start_live_report(&self) -> Result<LiveReportHandle, CoreError> {
        let ids = self.reported(&Region::Modal, self.pins.list())?;
        let coins: Vec<Coin> = ids
            .iter()
            .filter_map(|id| {
                let coin = self.catalog.find_by_id(id).cloned();
                if coin.is_none() {
                    warn!("Pinned coin {id} is not in the catalog; not tracked");
                }
                coin
            })
            .collect();

        info!("Starting live report for {} of {} pinned coins", coins.len(), ids.len());
        match self.engine.start(coins) {
            // Already shown by the engine.
            Err(CoreError::NothingPinned) => Err(CoreError::NothingPinned),
            other => self.reported(&Region::Modal, other),
        }
    }
}
