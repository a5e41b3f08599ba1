//! Bybit v5 kline client
//!
//! Fetches spot candles and falls back to synthetic data on any failure.

use super::{interval_millis, normalize_interval, synthetic_series, MarketDataSource};
use crate::config::MarketDataConfig;
use crate::error::{BotError, Result};
use crate::types::{Candle, CandleSeries};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Bybit kline source
#[derive(Clone)]
pub struct BybitDataSource {
    http: Client,
    base_url: String,
    category: String,
    synthetic_seed: u64,
}

#[derive(Debug, Deserialize)]
struct KlineResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<KlineResult>,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

impl BybitDataSource {
    /// Create a new client with a bounded request timeout
    pub fn new(config: &MarketDataConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
            synthetic_seed: config.synthetic_seed,
        })
    }

    /// Fetch klines without fallback
    pub async fn try_fetch(&self, symbol: &str, interval: &str, limit: usize) -> Result<CandleSeries> {
        let url = format!("{}/v5/market/kline", self.base_url);
        let limit = limit.to_string();
        let resp: KlineResponse = self
            .http
            .get(&url)
            .query(&[
                ("category", self.category.as_str()),
                ("symbol", symbol),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.ret_code != 0 {
            return Err(BotError::DataUnavailable(format!(
                "retCode {}: {}",
                resp.ret_code, resp.ret_msg
            )));
        }

        let rows = resp.result.map(|r| r.list).unwrap_or_default();
        if rows.is_empty() {
            return Err(BotError::DataUnavailable(format!("no klines for {}", symbol)));
        }

        let candles = rows
            .iter()
            .map(|row| parse_kline_row(row))
            .collect::<Result<Vec<_>>>()?;

        // Bybit returns newest first; CandleSeries sorts ascending
        Ok(CandleSeries::new(candles))
    }

    fn fallback(&self, interval: &str, limit: usize) -> CandleSeries {
        let step = interval_millis(interval);
        let now = Utc::now().timestamp_millis();
        synthetic_series(limit, self.synthetic_seed, now - now.rem_euclid(step.max(1)), step)
    }
}

/// Parse `[start, open, high, low, close, volume, turnover]`
fn parse_kline_row(row: &[String]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(BotError::DataUnavailable(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let num = |idx: usize| -> Result<f64> {
        row[idx]
            .parse::<f64>()
            .map_err(|e| BotError::DataUnavailable(format!("bad kline field {}: {}", idx, e)))
    };

    let timestamp = row[0]
        .parse::<i64>()
        .map_err(|e| BotError::DataUnavailable(format!("bad kline timestamp: {}", e)))?;

    Ok(Candle::new(timestamp, num(1)?, num(2)?, num(3)?, num(4)?, num(5)?))
}

#[async_trait]
impl MarketDataSource for BybitDataSource {
    async fn fetch(&self, symbol: &str, timeframe: &str, limit: usize) -> CandleSeries {
        let interval = normalize_interval(timeframe);

        match self.try_fetch(symbol, &interval, limit).await {
            Ok(series) => {
                debug!("Fetched {} candles for {} {}", series.len(), symbol, interval);
                series
            }
            Err(e) => {
                warn!(
                    "Kline fetch failed for {} {}: {} - using synthetic data",
                    symbol, interval, e
                );
                self.fallback(&interval, limit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_kline_row() {
        let candle = parse_kline_row(&row(&[
            "1670608800000", "17071", "17073", "17027", "17055.5", "268611", "4582.1",
        ]))
        .unwrap();
        assert_eq!(candle.timestamp, 1670608800000);
        assert_eq!(candle.open, 17071.0);
        assert_eq!(candle.high, 17073.0);
        assert_eq!(candle.low, 17027.0);
        assert_eq!(candle.close, 17055.5);
        assert_eq!(candle.volume, 268611.0);
    }

    #[test]
    fn test_parse_kline_row_rejects_short_or_bad_rows() {
        assert!(parse_kline_row(&row(&["1", "2", "3"])).is_err());
        assert!(parse_kline_row(&row(&["x", "1", "2", "0.5", "1", "10"])).is_err());
        assert!(parse_kline_row(&row(&["1", "1", "abc", "0.5", "1", "10"])).is_err());
    }

    #[test]
    fn test_kline_response_deserialization() {
        let json = r#"{
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "category": "spot",
                "symbol": "BTCUSDT",
                "list": [["1670608800000","1","2","0.5","1.5","10","15"]]
            }
        }"#;
        let resp: KlineResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.ret_code, 0);
        assert_eq!(resp.result.unwrap().list.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_falls_back_to_synthetic() {
        let config = MarketDataConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let source = BybitDataSource::new(&config).unwrap();

        let series = source.fetch("BTCUSDT", "15m", 100).await;
        assert_eq!(series.len(), 100);
        assert!(series.is_well_formed());

        let again = source.fetch("BTCUSDT", "15m", 100).await;
        assert_eq!(series.closes(), again.closes());
    }

    #[tokio::test]
    async fn test_fallback_survives_degenerate_timeframes() {
        let config = MarketDataConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let source = BybitDataSource::new(&config).unwrap();

        for timeframe in ["0", "999999999999999", "-5"] {
            let series = source.fetch("BTCUSDT", timeframe, 100).await;
            assert_eq!(series.len(), 100, "timeframe {timeframe}");
            assert!(series.is_well_formed(), "timeframe {timeframe}");
        }
    }
}
