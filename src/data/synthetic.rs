//! Deterministic synthetic candles used when live data is unavailable

use crate::types::{Candle, CandleSeries};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BASE_PRICE: f64 = 50_000.0;

/// Generate `limit` candles ending at `end_ms`, spaced `step_ms` apart.
///
/// Same seed, same prices. Candles are well formed: the high is at or above
/// both open and close, the low at or below.
pub fn synthetic_series(limit: usize, seed: u64, end_ms: i64, step_ms: i64) -> CandleSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let step = step_ms.max(1);

    let candles = (0..limit)
        .map(|i| {
            let open = BASE_PRICE + rng.random_range(-1000.0..1000.0);
            let close = BASE_PRICE + rng.random_range(-1000.0..1000.0);
            let high = open.max(close) + rng.random_range(0.0..500.0);
            let low = open.min(close) - rng.random_range(0.0..500.0);
            let volume = rng.random_range(100.0..1000.0);
            let timestamp = end_ms - (limit - 1 - i) as i64 * step;
            Candle::new(timestamp, open, high, low, close, volume)
        })
        .collect();

    CandleSeries::new(candles)
}
