use crate::errors::CoreError;
use crate::models::chart::ChartSeries;
use crate::models::coin::Coin;
use crate::models::detail::CoinDetail;
use crate::models::pin::OverflowPrompt;

/// UI region a loading indicator or message belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    /// The main content area (coin list, chart)
    Main,
    /// The value panel of one coin card, by coin id
    Coin(String),
    /// The shared modal dialog
    Modal,
}

/// A message for the user: modal header plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub title: String,
    pub body: String,
}

impl UserMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Message shown for a failed operation.
    pub fn from_error(err: &CoreError) -> Self {
        let title = match err {
            CoreError::InvalidInput(_) => "Invalid Input!",
            CoreError::NotFound(_) => "The requested coin was not found",
            CoreError::StaleReference { .. } | CoreError::PartialResolution { .. } => "Hey!",
            CoreError::CapacityExceeded { .. } => "You've reached the limit of checked coins!",
            _ => "Error!",
        };
        let body = match err {
            // The failed coins are the point of this message, so keep them.
            CoreError::PartialResolution { .. } => err.to_string(),
            _ => err.user_message(),
        };
        Self::new(title, body)
    }
}

/// Rendering side of the application.
///
/// The core calls these synchronously and ignores any outcome; they must not
/// call back into the core.
pub trait Presenter: Send + Sync {
    fn show_loading(&self, region: &Region);

    fn hide_loading(&self, region: &Region);

    /// Replace the main area with one card per coin.
    fn render_coins(&self, coins: &[Coin]);

    /// Fill a coin card's value panel.
    fn render_detail(&self, detail: &CoinDetail);

    /// Draw or redraw the live chart.
    fn render_chart(&self, series: &ChartSeries);

    fn show_message(&self, region: &Region, message: &UserMessage);

    /// Ask the user which pinned coin to drop in favour of the candidate.
    fn show_overflow(&self, prompt: &OverflowPrompt);

    /// List the pinned coins (with their toggles).
    fn show_pinned(&self, ids: &[String]);
}

/// Presenter that discards everything. Useful for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn show_loading(&self, _region: &Region) {}
    fn hide_loading(&self, _region: &Region) {}
    fn render_coins(&self, _coins: &[Coin]) {}
    fn render_detail(&self, _detail: &CoinDetail) {}
    fn render_chart(&self, _series: &ChartSeries) {}
    fn show_message(&self, _region: &Region, _message: &UserMessage) {}
    fn show_overflow(&self, _prompt: &OverflowPrompt) {}
    fn show_pinned(&self, _ids: &[String]) {}
}
