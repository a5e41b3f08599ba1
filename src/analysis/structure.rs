//! Structure detectors
//!
//! Trailing windows cover the candles before the last one; the last candle is
//! the one being tested against them. All detectors return `false` on short
//! or malformed input.

use crate::types::CandleSeries;

/// Minimum series length for order-block detection
pub const MIN_ORDER_BLOCK_CANDLES: usize = 20;
/// Trailing window of the order-block high
pub const ORDER_BLOCK_LOOKBACK: usize = 10;
/// Trailing window of the break-of-structure high
pub const BOS_LOOKBACK: usize = 20;

const ORDER_BLOCK_RATIO: f64 = 0.998;
const BOS_RATIO: f64 = 1.002;
const FVG_RANGE_MULTIPLIER: f64 = 1.5;

fn trailing_high(series: &CandleSeries, lookback: usize) -> Option<f64> {
    series
        .preceding(lookback)?
        .iter()
        .map(|c| c.high)
        .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))))
}

/// Last close above 99.8% of the 10-candle trailing high, with at least
/// 20 candles of history.
pub fn order_block_detected(series: &CandleSeries) -> bool {
    if series.len() < MIN_ORDER_BLOCK_CANDLES || !series.is_well_formed() {
        return false;
    }
    match (series.last(), trailing_high(series, ORDER_BLOCK_LOOKBACK)) {
        (Some(last), Some(high)) => last.close > high * ORDER_BLOCK_RATIO,
        _ => false,
    }
}

/// Any `i` with `|high[i] - low[i+2]|` above 1.5x the series-wide mean range.
pub fn fair_value_gap_detected(series: &CandleSeries) -> bool {
    let candles = series.candles();
    if candles.len() < 3 || !series.is_well_formed() {
        return false;
    }

    let mean_range = candles.iter().map(|c| c.range()).sum::<f64>() / candles.len() as f64;
    let threshold = mean_range * FVG_RANGE_MULTIPLIER;

    candles
        .windows(3)
        .any(|w| (w[0].high - w[2].low).abs() > threshold)
}

/// Last close above 1.002x the 20-candle trailing high.
pub fn break_of_structure(series: &CandleSeries) -> bool {
    if !series.is_well_formed() {
        return false;
    }
    match (series.last(), trailing_high(series, BOS_LOOKBACK)) {
        (Some(last), Some(high)) => last.close > high * BOS_RATIO,
        _ => false,
    }
}
