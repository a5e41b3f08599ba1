//! Confluence Signal Bot
//!
//! Technical-analysis signal engine with an autonomous paper auto-trader.
//!
//! ## Architecture
//!
//! ```text
//! MarketDataSource (Bybit / synthetic) → Strategy (confluence or sampled) → AutoTrader loop
//!                  ↑                                ↑                            ↓
//!        Indicators (EMA, MACD, ATR,        StrategyRegistry           Notifier + TradeRecorder
//!        SuperTrend, Bollinger, RSI)
//!        Structure (OB, FVG, BOS)
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod notify;
pub mod paper;
pub mod storage;
pub mod strategy;
pub mod testing;
pub mod types;

#[cfg(test)]
mod config_tests;
