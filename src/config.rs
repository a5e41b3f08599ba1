//! Configuration
//!
//! Loaded from an optional TOML file, then overridden by `BOT__`-prefixed
//! environment variables (e.g. `BOT__SCHEDULER__INTERVAL_SECS=5`).

use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub strategy: StrategySettings,
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config: Config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("BOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheduler.interval_secs == 0 {
            return Err(BotError::Configuration(
                "scheduler.interval_secs must be positive".to_string(),
            ));
        }
        if self.scheduler.weak_threshold > self.scheduler.strong_threshold {
            return Err(BotError::Configuration(format!(
                "scheduler.weak_threshold ({}) exceeds strong_threshold ({})",
                self.scheduler.weak_threshold, self.scheduler.strong_threshold
            )));
        }
        if self.market_data.timeout_secs == 0 {
            return Err(BotError::Configuration(
                "market_data.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Kline source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Request timeout; the source falls back to synthetic data past this
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Candles fetched per evaluation
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Seed of the synthetic fallback series
    #[serde(default = "default_synthetic_seed")]
    pub synthetic_seed: u64,
}

fn default_base_url() -> String {
    "https://api.bybit.com".to_string()
}

fn default_category() -> String {
    "spot".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_limit() -> usize {
    100
}

fn default_synthetic_seed() -> u64 {
    42
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            category: default_category(),
            timeout_secs: default_timeout_secs(),
            limit: default_limit(),
            synthetic_seed: default_synthetic_seed(),
        }
    }
}

/// Auto-trader loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Confirmations needed for a strong outcome
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: usize,
    /// Confirmations needed for a weak outcome
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: usize,
    /// Profit credited per strong outcome (%)
    #[serde(default = "default_win_profit_pct")]
    pub win_profit_pct: Decimal,
    /// Loss debited per weak outcome (%)
    #[serde(default = "default_loss_pct")]
    pub loss_pct: Decimal,
}

fn default_interval_secs() -> u64 {
    10
}

fn default_strong_threshold() -> usize {
    6
}

fn default_weak_threshold() -> usize {
    3
}

fn default_win_profit_pct() -> Decimal {
    dec!(35)
}

fn default_loss_pct() -> Decimal {
    dec!(8)
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            strong_threshold: default_strong_threshold(),
            weak_threshold: default_weak_threshold(),
            win_profit_pct: default_win_profit_pct(),
            loss_pct: default_loss_pct(),
        }
    }
}

/// Trade recorder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// JSONL file; `~` is expanded
    #[serde(default = "default_recorder_path")]
    pub path: String,
    /// Base size of a simulated order, multiplied by leverage
    #[serde(default = "default_order_amount")]
    pub order_amount: Decimal,
}

fn default_recorder_path() -> String {
    "trade_history.jsonl".to_string()
}

fn default_order_amount() -> Decimal {
    dec!(0.01)
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            path: default_recorder_path(),
            order_amount: default_order_amount(),
        }
    }
}

/// Strategy selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySettings {
    /// Strategy identifier active at startup
    #[serde(default = "default_strategy")]
    pub default: String,
    /// Seed for the sampled strategies; random when unset
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default = "default_leverage")]
    pub default_leverage: u32,
}

fn default_strategy() -> String {
    "quantum".to_string()
}

fn default_leverage() -> u32 {
    10
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            default: default_strategy(),
            rng_seed: None,
            default_leverage: default_leverage(),
        }
    }
}

/// Telegram notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Privileged recipient of every auto-trader notification
    pub admin_chat_id: String,
}
