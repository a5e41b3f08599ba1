//! Sampled strategies
//!
//! Momentum, breakout and mean-reversion each pick a random-size random subset
//! of their fixed candidate labels. The RNG is injected so runs are
//! reproducible.

use super::{SignalStrategy, StrategyKind};
use crate::types::ConfirmationLabel;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

pub const MOMENTUM_LABELS: &[&str] = &[
    "Momentum Break",
    "Volume Spike",
    "RSI Oversold",
    "EMA Golden Cross",
    "Price Acceleration",
    "Trend Continuation",
];

pub const BREAKOUT_LABELS: &[&str] = &[
    "Resistance Break",
    "Support Break",
    "Volume Confirmation",
    "Bollinger Breakout",
    "Triangle Pattern",
    "Flag Pattern",
];

pub const MEAN_REVERSION_LABELS: &[&str] = &[
    "RSI Overbought",
    "Bollinger Upper Touch",
    "Price Rejection",
    "Volume Divergence",
    "Support Test",
    "Mean Touch",
];

/// Smallest subset a sampled strategy returns
pub const MIN_SAMPLE: usize = 2;

pub struct SampledStrategy {
    kind: StrategyKind,
    candidates: &'static [&'static str],
    rng: Mutex<StdRng>,
}

impl SampledStrategy {
    pub fn new(kind: StrategyKind, candidates: &'static [&'static str], rng: StdRng) -> Self {
        Self {
            kind,
            candidates,
            rng: Mutex::new(rng),
        }
    }

    /// Built-in candidate pool for `kind`; `None` for the confluence engine
    pub fn for_kind(kind: StrategyKind, rng: StdRng) -> Option<Self> {
        let candidates = match kind {
            StrategyKind::Momentum => MOMENTUM_LABELS,
            StrategyKind::Breakout => BREAKOUT_LABELS,
            StrategyKind::MeanReversion => MEAN_REVERSION_LABELS,
            StrategyKind::Quantum => return None,
        };
        Some(Self::new(kind, candidates, rng))
    }

    pub fn candidates(&self) -> &'static [&'static str] {
        self.candidates
    }

    /// Draw one subset of size `MIN_SAMPLE..=candidates.len()`
    pub fn sample(&self) -> Vec<ConfirmationLabel> {
        let total = self.candidates.len();
        let mut rng = self.rng.lock();

        let size = if total <= MIN_SAMPLE {
            total
        } else {
            rng.random_range(MIN_SAMPLE..=total)
        };

        self.candidates
            .choose_multiple(&mut *rng, size)
            .map(|label| ConfirmationLabel::new(*label))
            .collect()
    }
}

#[async_trait]
impl SignalStrategy for SampledStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn evaluate(&self, symbol: &str, _timeframes: &[String]) -> Vec<ConfirmationLabel> {
        let labels = self.sample();
        debug!("{} drew {} labels for {}", self.kind, labels.len(), symbol);
        labels
    }
}
