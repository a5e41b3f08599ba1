//! MACD (Moving Average Convergence Divergence).
//!
//! macd = EMA(fast) - EMA(slow); signal = EMA(macd, signal);
//! histogram = macd - signal.

use super::ema;

/// MACD output, aligned with the input closes
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdOutput {
    /// MACD line crossed above the signal line on the last entry
    pub fn bullish_cross(&self) -> bool {
        super::crossed_above(&self.macd, &self.signal)
    }
}

/// Compute MACD. `None` for empty input or a zero span.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdOutput> {
    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;

    let macd: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&macd, signal)?;
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Some(MacdOutput {
        macd,
        signal,
        histogram,
    })
}
