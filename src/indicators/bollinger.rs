//! Bollinger Bands.
//!
//! middle = SMA(period); upper/lower = middle ± k * sample standard deviation.

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BollingerBands {
    /// upper - lower at `index`
    pub fn width(&self, index: usize) -> Option<f64> {
        Some(self.upper.get(index).copied().flatten()? - self.lower.get(index).copied().flatten()?)
    }

    /// Band width now is narrower than `lookback` entries ago
    pub fn is_squeezing(&self, lookback: usize) -> bool {
        let n = self.upper.len();
        if n == 0 || n <= lookback {
            return false;
        }
        match (self.width(n - 1), self.width(n - 1 - lookback)) {
            (Some(now), Some(then)) => now < then,
            _ => false,
        }
    }
}

/// `None` if fewer than `period` closes or `period < 2`.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> Option<BollingerBands> {
    let n = closes.len();
    if period < 2 || n < period {
        return None;
    }

    let mut upper = vec![None; n];
    let mut middle = vec![None; n];
    let mut lower = vec![None; n];

    for end in period..=n {
        let window = &closes[end - period..end];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        let sd = var.sqrt();

        let i = end - 1;
        middle[i] = Some(mean);
        upper[i] = Some(mean + k * sd);
        lower[i] = Some(mean - k * sd);
    }

    Some(BollingerBands {
        upper,
        middle,
        lower,
    })
}
