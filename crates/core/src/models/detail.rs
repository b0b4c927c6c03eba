use serde::{Deserialize, Serialize};

/// Extended info shown under "Show More Info": current price in three
/// currencies plus the small logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub usd: f64,
    pub eur: f64,
    pub ils: f64,
    /// URL of the small logo image
    pub logo: String,
}

impl CoinDetail {
    /// Build a detail record from possibly-missing upstream quotes.
    ///
    /// If any of the three quotes is missing, all three become `0.0`.
    /// Zero here is an explicit default, not a marker for "unknown".
    pub fn from_quotes(
        id: impl Into<String>,
        usd: Option<f64>,
        eur: Option<f64>,
        ils: Option<f64>,
        logo: impl Into<String>,
    ) -> Self {
        let (usd, eur, ils) = match (usd, eur, ils) {
            (Some(usd), Some(eur), Some(ils)) => (usd, eur, ils),
            _ => (0.0, 0.0, 0.0),
        };
        Self {
            id: id.into(),
            usd,
            eur,
            ils,
            logo: logo.into(),
        }
    }

    /// Text block rendered in the coin card.
    pub fn summary(&self) -> String {
        format!("USD: {}$\nEUR: {}€\nILS: {}₪", self.usd, self.eur, self.ils)
    }
}
