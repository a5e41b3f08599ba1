//! Exponential Moving Average (EMA).
//!
//! EMA[0] = value[0]; EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (period + 1). No look-ahead, defined from the first value.

/// EMA of `values`. `None` for an empty input or a zero period.
pub fn ema(values: &[f64], period: usize) -> Option<Vec<f64>> {
    let first = *values.first()?;
    if period == 0 {
        return None;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    out.push(prev);

    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }

    Some(out)
}
