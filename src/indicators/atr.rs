//! Average True Range (ATR).
//!
//! TR[0] = high - low; TR[t] = max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is the rolling mean of TR over `period`.

use super::rolling_mean;
use crate::types::Candle;

/// True range series, aligned with `candles`.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(pc) => hl.max((c.high - pc).abs()).max((c.low - pc).abs()),
                None => hl,
            }
        })
        .collect()
}

/// ATR over `period`. `None` if fewer than `period` candles.
pub fn atr(candles: &[Candle], period: usize) -> Option<Vec<Option<f64>>> {
    if period == 0 || candles.len() < period {
        return None;
    }
    Some(rolling_mean(&true_range(candles), period))
}
