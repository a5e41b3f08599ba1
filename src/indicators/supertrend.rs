//! SuperTrend.
//!
//! Bands: hl2 ± multiplier * ATR(period). Direction is +1 when the close
//! breaks above the previous upper band, -1 when it breaks below the previous
//! lower band, 0 otherwise (including while the bands are undefined).

use super::atr;
use crate::types::Candle;

#[derive(Debug, Clone, PartialEq)]
pub struct SuperTrend {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub direction: Vec<i8>,
}

impl SuperTrend {
    pub fn last_direction(&self) -> i8 {
        self.direction.last().copied().unwrap_or(0)
    }
}

/// `None` if fewer than `period` candles.
pub fn supertrend(candles: &[Candle], period: usize, multiplier: f64) -> Option<SuperTrend> {
    let atr = atr(candles, period)?;

    let (upper, lower): (Vec<_>, Vec<_>) = candles
        .iter()
        .zip(&atr)
        .map(|(c, a)| match a {
            Some(a) => (Some(c.hl2() + multiplier * a), Some(c.hl2() - multiplier * a)),
            None => (None, None),
        })
        .unzip();

    let direction = candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let Some(prev) = i.checked_sub(1) else {
                return 0;
            };
            match (upper[prev], lower[prev]) {
                (Some(up), _) if c.close > up => 1,
                (_, Some(lo)) if c.close < lo => -1,
                _ => 0,
            }
        })
        .collect();

    Some(SuperTrend {
        upper,
        lower,
        direction,
    })
}
