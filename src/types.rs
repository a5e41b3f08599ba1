//! Core data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Single OHLCV candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in milliseconds since epoch
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High minus low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Midpoint of the candle, (high + low) / 2
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// True if every price and the volume is a finite number
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Candles ordered ascending by timestamp, no duplicate timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series, sorting by timestamp and dropping repeated timestamps
    /// (the first occurrence wins).
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Whether every candle holds finite values
    pub fn is_well_formed(&self) -> bool {
        self.candles.iter().all(Candle::is_finite)
    }

    /// The `n` candles immediately before the last one.
    ///
    /// Returns `None` when fewer than `n + 1` candles exist.
    pub fn preceding(&self, n: usize) -> Option<&[Candle]> {
        let len = self.candles.len();
        if n == 0 || len < n + 1 {
            return None;
        }
        Some(&self.candles[len - 1 - n..len - 1])
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::new(candles)
    }
}

/// Sentinel emitted by a strategy that failed to evaluate
pub const ERROR_LABEL: &str = "System Error - Using Fallback";

/// One detected condition, e.g. "Order Block Break"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmationLabel(String);

impl ConfirmationLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The data/system error sentinel
    pub fn error() -> Self {
        Self(ERROR_LABEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_error(&self) -> bool {
        self.0 == ERROR_LABEL
    }
}

impl fmt::Display for ConfirmationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfirmationLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Number of labels that count toward an outcome (error sentinels excluded)
pub fn tradable_count(labels: &[ConfirmationLabel]) -> usize {
    labels.iter().filter(|l| !l.is_error()).count()
}

/// Comma-separated label list for messages
pub fn join_labels(labels: &[ConfirmationLabel]) -> String {
    labels
        .iter()
        .map(ConfirmationLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
