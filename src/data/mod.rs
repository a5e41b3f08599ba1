//! Market data sources
//!
//! A source always hands back a well-formed series. Network or parse failures
//! fall back to a deterministic synthetic series of the requested length.

pub mod bybit;
pub mod synthetic;

pub use bybit::BybitDataSource;
pub use synthetic::synthetic_series;

use crate::types::CandleSeries;
use async_trait::async_trait;

/// Timeframe used when a strategy is handed an empty timeframe list
pub const DEFAULT_TIMEFRAME: &str = "15";

/// Fetches recent candles for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `limit` candles, oldest first. Never fails.
    async fn fetch(&self, symbol: &str, timeframe: &str, limit: usize) -> CandleSeries;
}

/// Map user-facing timeframes ("15m", "1h", "1d") to Bybit kline intervals.
///
/// Identifiers already in Bybit form ("15", "60", "D") pass through.
/// Unknown identifiers are returned unchanged so the exchange can reject them.
pub fn normalize_interval(timeframe: &str) -> String {
    let tf = timeframe.trim();
    // "1M" is a month; lowercasing would turn it into a minute
    if tf == "M" || tf == "1M" {
        return "M".to_string();
    }
    let interval = match tf.to_lowercase().as_str() {
        "1m" => "1",
        "3m" => "3",
        "5m" => "5",
        "15m" => "15",
        "30m" => "30",
        "1h" => "60",
        "2h" => "120",
        "4h" => "240",
        "6h" => "360",
        "12h" => "720",
        "1d" | "d" => "D",
        "1w" | "w" => "W",
        _ => return tf.to_string(),
    };
    interval.to_string()
}

/// Length of one candle of a Bybit interval in milliseconds.
///
/// Always positive. Numeric intervals outside one minute to one month map to
/// one minute.
pub fn interval_millis(interval: &str) -> i64 {
    const MINUTE: i64 = 60_000;
    const MONTH: i64 = 30 * 24 * 60 * MINUTE;
    match interval {
        "D" => 24 * 60 * MINUTE,
        "W" => 7 * 24 * 60 * MINUTE,
        "M" => MONTH,
        other => other
            .parse::<i64>()
            .ok()
            .filter(|m| *m > 0)
            .and_then(|m| m.checked_mul(MINUTE))
            .filter(|ms| *ms <= MONTH)
            .unwrap_or(MINUTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_interval() {
        assert_eq!(normalize_interval("15m"), "15");
        assert_eq!(normalize_interval("1h"), "60");
        assert_eq!(normalize_interval("4H"), "240");
        assert_eq!(normalize_interval("1d"), "D");
        assert_eq!(normalize_interval("1w"), "W");
        assert_eq!(normalize_interval("1M"), "M");
        assert_eq!(normalize_interval("15"), "15");
        assert_eq!(normalize_interval("D"), "D");
        assert_eq!(normalize_interval("weird"), "weird");
    }

    #[test]
    fn test_interval_millis() {
        assert_eq!(interval_millis("1"), 60_000);
        assert_eq!(interval_millis("60"), 3_600_000);
        assert_eq!(interval_millis("D"), 86_400_000);
        assert_eq!(interval_millis("garbage"), 60_000);
    }

    #[test]
    fn test_interval_millis_out_of_range_is_one_minute() {
        assert_eq!(interval_millis("0"), 60_000);
        assert_eq!(interval_millis("-15"), 60_000);
        assert_eq!(interval_millis("999999999999999"), 60_000);
        assert_eq!(interval_millis(&i64::MAX.to_string()), 60_000);
    }
}
