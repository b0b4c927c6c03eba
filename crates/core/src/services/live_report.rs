use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::chart::ChartSeries;
use crate::models::coin::Coin;
use crate::models::settings::Settings;
use crate::presentation::{Presenter, Region, UserMessage};
use crate::providers::traits::PriceFeed;

/// Lifecycle of one live-report session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Starting,
    /// A tick is in flight or the loop waits for the next one
    Polling { tick: u64 },
    Stopped(StopReason),
}

impl PollState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, PollState::Stopped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The hosting view was closed
    TornDown,
    /// The price request failed; the session does not retry
    TransportFailure(String),
    /// Every tracked coin failed to resolve
    NothingLeft,
}

/// What one reconciled response did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Every tracked symbol resolved; one sample per coin was appended
    Sampled { samples: usize },
    /// Some coins did not resolve and were dropped for the rest of the session
    Dropped { failed: Vec<String> },
}

/// Reconcile one batch response against the tracked coins.
///
/// Full match: append one sample per tracked coin stamped `received_at`.
/// Otherwise: drop the coins whose symbol is missing from `prices` and
/// record nothing for this tick.
///
/// Prices are keyed by symbol, so only the first tracked coin of a symbol
/// can resolve; later coins sharing it count as unresolved.
pub fn reconcile(
    tracked: &mut Vec<Coin>,
    prices: &HashMap<String, f64>,
    series: &mut ChartSeries,
    received_at: DateTime<Utc>,
) -> TickOutcome {
    let mut seen = HashSet::new();
    let failed: Vec<String> = tracked
        .iter()
        .filter(|coin| {
            let symbol = coin.quote_symbol();
            !prices.contains_key(&symbol) || !seen.insert(symbol)
        })
        .map(|coin| coin.id.clone())
        .collect();

    if !failed.is_empty() {
        tracked.retain(|coin| !failed.contains(&coin.id));
        return TickOutcome::Dropped { failed };
    }

    for coin in tracked.iter() {
        let symbol = coin.quote_symbol();
        series.push(&symbol, received_at, prices[&symbol]);
    }
    TickOutcome::Sampled {
        samples: tracked.len(),
    }
}

/// Distinct quote symbols of `tracked`, in first-seen order.
fn request_symbols(tracked: &[Coin]) -> Vec<String> {
    let mut seen = HashSet::new();
    tracked
        .iter()
        .map(Coin::quote_symbol)
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}

/// Starts live-report sessions: a recurring batch price fetch for the
/// pinned coins feeding the chart.
pub struct LivePollEngine {
    feed: Arc<dyn PriceFeed>,
    presenter: Arc<dyn Presenter>,
    interval: Duration,
    currency: String,
}

impl LivePollEngine {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        presenter: Arc<dyn Presenter>,
        interval: Duration,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            feed,
            presenter,
            interval,
            currency: currency.into(),
        }
    }

    pub fn from_settings(
        feed: Arc<dyn PriceFeed>,
        presenter: Arc<dyn Presenter>,
        settings: &Settings,
    ) -> Self {
        Self::new(
            feed,
            presenter,
            settings.poll_interval(),
            settings.quote_currency.clone(),
        )
    }

    /// Start polling `coins`. Requires a tokio runtime.
    ///
    /// With no coins the session ends before the first tick: the user is told
    /// nothing is selected and `NothingPinned` is returned.
    pub fn start(&self, coins: Vec<Coin>) -> Result<LiveReportHandle, CoreError> {
        if coins.is_empty() {
            self.presenter.show_message(
                &Region::Modal,
                &UserMessage::from_error(&CoreError::NothingPinned),
            );
            return Err(CoreError::NothingPinned);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            CoreError::Configuration("live report needs a running tokio runtime".into())
        })?;

        let session_id = Uuid::new_v4();
        let (state_tx, state_rx) = watch::channel(PollState::Starting);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tracked = Arc::new(Mutex::new(coins));
        let series = Arc::new(Mutex::new(ChartSeries::new()));

        self.presenter.show_message(
            &Region::Modal,
            &UserMessage::new("Loading Live Graph", "Please wait..."),
        );
        info!("Live report {session_id} starting");

        let session = Session {
            id: session_id,
            feed: Arc::clone(&self.feed),
            presenter: Arc::clone(&self.presenter),
            interval: self.interval,
            currency: self.currency.clone(),
            tracked: Arc::clone(&tracked),
            series: Arc::clone(&series),
            state: state_tx,
        };
        let task = runtime.spawn(session.run(shutdown_rx));

        Ok(LiveReportHandle {
            session_id,
            state: state_rx,
            shutdown: shutdown_tx,
            tracked,
            series,
            task,
        })
    }
}

struct Session {
    id: Uuid,
    feed: Arc<dyn PriceFeed>,
    presenter: Arc<dyn Presenter>,
    interval: Duration,
    currency: String,
    tracked: Arc<Mutex<Vec<Coin>>>,
    series: Arc<Mutex<ChartSeries>>,
    state: watch::Sender<PollState>,
}

impl Session {
    /// Poll loop. Ticks run strictly one after another: the next one is only
    /// scheduled once the previous response has been reconciled.
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut tick: u64 = 0;

        let reason = loop {
            if *shutdown.borrow() {
                break StopReason::TornDown;
            }
            self.state.send_replace(PollState::Polling { tick });

            let symbols = {
                let tracked = self.tracked.lock().unwrap_or_else(|e| e.into_inner());
                request_symbols(&tracked)
            };

            let response = tokio::select! {
                response = self.feed.fetch_prices(&symbols, &self.currency) => response,
                _ = shutdown.changed() => break StopReason::TornDown,
            };
            let received_at = Utc::now();

            let prices = match response {
                Ok(prices) => prices,
                Err(e) => {
                    warn!("Live report {} halted on tick {tick}: {e}", self.id);
                    self.presenter
                        .show_message(&Region::Main, &UserMessage::from_error(&e));
                    break StopReason::TransportFailure(e.to_string());
                }
            };

            if let Some(reason) = self.apply(tick, &prices, received_at) {
                break reason;
            }

            tick += 1;
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break StopReason::TornDown,
            }
        };

        info!("Live report {} stopped after {tick} ticks: {reason:?}", self.id);
        self.state.send_replace(PollState::Stopped(reason));
    }

    /// Reconcile one response and update the UI. Returns a stop reason if the
    /// session cannot continue.
    fn apply(
        &self,
        tick: u64,
        prices: &HashMap<String, f64>,
        received_at: DateTime<Utc>,
    ) -> Option<StopReason> {
        let (outcome, remaining, snapshot) = {
            let mut tracked = self.tracked.lock().unwrap_or_else(|e| e.into_inner());
            let mut series = self.series.lock().unwrap_or_else(|e| e.into_inner());
            let was_empty = series.is_empty();
            let outcome = reconcile(&mut tracked, prices, &mut series, received_at);
            let snapshot = match outcome {
                TickOutcome::Sampled { .. } => Some((series.clone(), was_empty)),
                TickOutcome::Dropped { .. } => None,
            };
            (outcome, tracked.len(), snapshot)
        };

        match outcome {
            TickOutcome::Sampled { samples } => {
                debug!("Live report {} tick {tick}: {samples} samples", self.id);
                if let Some((series, first)) = snapshot {
                    if first {
                        self.presenter.show_message(
                            &Region::Modal,
                            &UserMessage::new("Success!", "Graph Loaded Successfully!"),
                        );
                    }
                    self.presenter.render_chart(&series);
                }
                None
            }
            TickOutcome::Dropped { failed } => {
                warn!(
                    "Live report {} tick {tick}: dropped {} unresolved coins",
                    self.id,
                    failed.len()
                );
                let err = CoreError::PartialResolution { failed };
                self.presenter
                    .show_message(&Region::Modal, &UserMessage::from_error(&err));
                (remaining == 0).then_some(StopReason::NothingLeft)
            }
        }
    }
}

/// Handle to a running live-report session.
///
/// Dropping the handle tears the session down.
pub struct LiveReportHandle {
    session_id: Uuid,
    state: watch::Receiver<PollState>,
    shutdown: watch::Sender<bool>,
    tracked: Arc<Mutex<Vec<Coin>>>,
    series: Arc<Mutex<ChartSeries>>,
    task: JoinHandle<()>,
}

impl LiveReportHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Coins still being polled.
    pub fn tracked(&self) -> Vec<Coin> {
        self.tracked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Copy of the chart data gathered so far.
    pub fn series(&self) -> ChartSeries {
        self.series
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Tear the session down. A pending tick is cancelled and an in-flight
    /// request is abandoned.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Wait until the session has stopped, for whatever reason.
    pub async fn stopped(&mut self) -> PollState {
        match self.state.wait_for(PollState::is_stopped).await {
            Ok(state) => state.clone(),
            // The loop is gone without publishing; treat it as torn down.
            Err(_) => PollState::Stopped(StopReason::TornDown),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for LiveReportHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}
