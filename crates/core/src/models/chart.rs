use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single chart sample: USD value at the moment the response arrived.
///
/// The core fills these in; the frontend only draws them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSample {
    /// Wall-clock time at receipt (not at request issue)
    pub timestamp: DateTime<Utc>,

    /// Non-negative value in the quote currency
    pub value: f64,
}

/// Per-symbol append-only sample sequences for one live-report session.
///
/// Keyed by upper-cased symbol, iterated in symbol order so legends are stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub series: BTreeMap<String, Vec<ChartSample>>,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample to `symbol`'s series. Negative or non-finite values
    /// are clamped to zero; the Y axis starts at zero.
    pub fn push(&mut self, symbol: &str, timestamp: DateTime<Utc>, value: f64) {
        let value = if value.is_finite() && value > 0.0 { value } else { 0.0 };
        self.series
            .entry(symbol.to_uppercase())
            .or_default()
            .push(ChartSample { timestamp, value });
    }

    pub fn get(&self, symbol: &str) -> Option<&[ChartSample]> {
        self.series.get(&symbol.to_uppercase()).map(|v| v.as_slice())
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.keys().map(|s| s.as_str()).collect()
    }

    /// Total number of samples across all symbols.
    pub fn total_samples(&self) -> usize {
        self.series.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
