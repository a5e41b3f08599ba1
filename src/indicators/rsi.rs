//! Relative Strength Index (RSI), Wilder smoothing.
//!
//! Seed: simple mean of the first `period` gains and losses. Then
//! avg = (prev_avg * (period - 1) + current) / period.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//!
//! Zero average loss: 100 when there is any gain, 50 when the window is flat.

/// RSI aligned with `closes`; first value at index `period`.
/// `None` if fewer than `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<Vec<Option<f64>>> {
    let n = closes.len();
    if period == 0 || n < period + 1 {
        return None;
    }

    let mut out = vec![None; n];
    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);

    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i <= period {
            avg_gain += gain / period as f64;
            avg_loss += loss / period as f64;
            if i < period {
                continue;
            }
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    Some(out)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}
