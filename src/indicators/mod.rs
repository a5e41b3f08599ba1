//! Technical indicators
//!
//! Pure functions over closes or candles. Every indicator returns `None` when
//! the input is shorter than its minimum window; callers treat that as "no
//! signal". Windowed outputs are aligned index-for-index with the input, with
//! `None` for leading entries whose window is not yet full.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod supertrend;

pub use atr::{atr, true_range};
pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema;
pub use macd::{macd, MacdOutput};
pub use rsi::rsi;
pub use supertrend::{supertrend, SuperTrend};

/// Rolling arithmetic mean. `None` until `period` values are available.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..n {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// True if `fast` crossed above `slow` between the last two entries:
/// `fast[-1] > slow[-1]` and `fast[-2] <= slow[-2]`.
pub fn crossed_above(fast: &[f64], slow: &[f64]) -> bool {
    let (n, m) = (fast.len(), slow.len());
    if n < 2 || m < 2 {
        return false;
    }
    fast[n - 1] > slow[m - 1] && fast[n - 2] <= slow[m - 2]
}

/// Build candles from closes for tests.
///
/// open = previous close, high/low = max/min(open, close) ± 1.0,
/// volume = 1000, one minute apart.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::types::Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            crate::types::Candle::new(
                i as i64 * 60_000,
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, epsilon={epsilon}"
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
