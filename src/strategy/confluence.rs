//! Confluence engine ("quantum" strategy)
//!
//! Combines the structure detectors with the indicator set over the primary
//! timeframe and emits one label per firing condition, in a fixed order,
//! followed by an approval label when enough of them line up.

use super::{SignalStrategy, StrategyKind};
use crate::analysis::{detect_structure, StructureSignals};
use crate::data::{MarketDataSource, DEFAULT_TIMEFRAME};
use crate::error::{BotError, Result};
use crate::indicators::{bollinger, crossed_above, ema, macd, rsi, supertrend};
use crate::types::{CandleSeries, ConfirmationLabel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const LABEL_ORDER_BLOCK_BREAK: &str = "Order Block Break";
pub const LABEL_FAIR_VALUE_GAP: &str = "Fair Value Gap";
pub const LABEL_BREAK_OF_STRUCTURE: &str = "Break of Structure";
pub const LABEL_EMA_MACD: &str = "EMA + MACD Confluence";
pub const LABEL_SUPERTREND: &str = "SuperTrend Signal";
pub const LABEL_BOLLINGER_SQUEEZE: &str = "Bollinger Squeeze";
pub const LABEL_BREAKOUT: &str = "Breakout Confirmation";
pub const LABEL_VOLUME_SURGE: &str = "Volume Surge";
pub const LABEL_HIDDEN_DIVERGENCE: &str = "Hidden Divergence";
pub const LABEL_APPROVAL: &str = "Quantum Approval";

/// Labels needed before the approval gate is considered
pub const APPROVAL_MIN_LABELS: usize = 3;

const EMA_FAST: usize = 9;
const EMA_SLOW: usize = 21;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const SUPERTREND_PERIOD: usize = 10;
const SUPERTREND_MULTIPLIER: f64 = 3.0;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_K: f64 = 2.0;
const SQUEEZE_LOOKBACK: usize = 10;
const VOLUME_LOOKBACK: usize = 20;
const VOLUME_SPIKE_RATIO: f64 = 1.5;
const BREAKOUT_LOOKBACK: usize = 20;
const RSI_PERIOD: usize = 14;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Every boolean the engine derives from one series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluenceSignals {
    pub structure: StructureSignals,
    pub ema_cross: bool,
    pub macd_cross: bool,
    pub supertrend_buy: bool,
    pub bollinger_squeeze: bool,
    pub breakout: bool,
    pub volume_spike: bool,
    pub rsi_extreme: bool,
}

impl ConfluenceSignals {
    /// Labels in emission order, approval last
    pub fn labels(&self) -> Vec<ConfirmationLabel> {
        let conditions = [
            (self.structure.order_block_break(), LABEL_ORDER_BLOCK_BREAK),
            (self.structure.fair_value_gap, LABEL_FAIR_VALUE_GAP),
            (self.structure.break_of_structure, LABEL_BREAK_OF_STRUCTURE),
            (self.ema_cross && self.macd_cross, LABEL_EMA_MACD),
            (self.supertrend_buy, LABEL_SUPERTREND),
            (self.bollinger_squeeze, LABEL_BOLLINGER_SQUEEZE),
            (self.breakout, LABEL_BREAKOUT),
            (self.volume_spike, LABEL_VOLUME_SURGE),
            (self.rsi_extreme, LABEL_HIDDEN_DIVERGENCE),
        ];

        let mut labels: Vec<ConfirmationLabel> = conditions
            .iter()
            .filter(|(fired, _)| *fired)
            .map(|(_, label)| ConfirmationLabel::new(*label))
            .collect();

        if self.approves(labels.len()) {
            labels.push(ConfirmationLabel::new(LABEL_APPROVAL));
        }
        labels
    }

    /// Approval gate over the count of non-approval labels
    pub fn approves(&self, label_count: usize) -> bool {
        label_count >= APPROVAL_MIN_LABELS && self.volume_spike && (self.ema_cross || self.macd_cross)
    }
}

/// Derive the signal bundle from a series.
///
/// Short series simply produce fewer signals; only empty or non-finite input
/// is an error.
pub fn analyze(series: &CandleSeries) -> Result<ConfluenceSignals> {
    if series.is_empty() {
        return Err(BotError::InsufficientHistory { needed: 1, got: 0 });
    }
    if !series.is_well_formed() {
        return Err(BotError::Evaluation("series contains non-finite values".into()));
    }

    let candles = series.candles();
    let closes = series.closes();
    let Some(last) = series.last() else {
        return Err(BotError::InsufficientHistory { needed: 1, got: 0 });
    };

    let ema_cross = match (ema(&closes, EMA_FAST), ema(&closes, EMA_SLOW)) {
        (Some(fast), Some(slow)) => crossed_above(&fast, &slow),
        _ => false,
    };

    let macd_cross = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
        .is_some_and(|m| m.bullish_cross());

    let supertrend_buy = supertrend(candles, SUPERTREND_PERIOD, SUPERTREND_MULTIPLIER)
        .is_some_and(|st| st.last_direction() == 1);

    let bollinger_squeeze = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_K)
        .is_some_and(|bb| bb.is_squeezing(SQUEEZE_LOOKBACK));

    let volume_spike = series.preceding(VOLUME_LOOKBACK).is_some_and(|window| {
        let mean = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;
        mean > 0.0 && last.volume >= VOLUME_SPIKE_RATIO * mean
    });

    let breakout = series.preceding(BREAKOUT_LOOKBACK).is_some_and(|window| {
        let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        last.close > high || last.close < low
    });

    let rsi_extreme = rsi(&closes, RSI_PERIOD)
        .and_then(|values| values.last().copied().flatten())
        .is_some_and(|r| r < RSI_OVERSOLD || r > RSI_OVERBOUGHT);

    Ok(ConfluenceSignals {
        structure: detect_structure(series),
        ema_cross,
        macd_cross,
        supertrend_buy,
        bollinger_squeeze,
        breakout,
        volume_spike,
        rsi_extreme,
    })
}

pub struct ConfluenceEngine {
    source: Arc<dyn MarketDataSource>,
    limit: usize,
}

impl ConfluenceEngine {
    pub fn new(source: Arc<dyn MarketDataSource>, limit: usize) -> Self {
        Self { source, limit }
    }

    /// Fetch and analyze the primary timeframe
    pub async fn signals(&self, symbol: &str, timeframes: &[String]) -> Result<ConfluenceSignals> {
        let timeframe = timeframes
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_TIMEFRAME);

        let series = self.source.fetch(symbol, timeframe, self.limit).await;
        analyze(&series)
    }
}

#[async_trait]
impl SignalStrategy for ConfluenceEngine {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Quantum
    }

    async fn evaluate(&self, symbol: &str, timeframes: &[String]) -> Vec<ConfirmationLabel> {
        match self.signals(symbol, timeframes).await {
            Ok(signals) => {
                let labels = signals.labels();
                debug!("Confluence for {}: {:?}", symbol, signals);
                labels
            }
            Err(e) => {
                warn!("Confluence evaluation failed for {}: {}", symbol, e);
                vec![ConfirmationLabel::error()]
            }
        }
    }
}
