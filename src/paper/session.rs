//! Session state and outcome classification

use crate::config::SchedulerConfig;
use crate::strategy::StrategyKind;
use crate::types::{join_labels, ConfirmationLabel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a session trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub symbol: String,
    /// First entry is the primary timeframe
    pub timeframes: Vec<String>,
    pub leverage: u32,
    pub strategy: StrategyKind,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            timeframes: Vec::new(),
            leverage: 10,
            strategy: StrategyKind::default(),
        }
    }
}

/// Running performance counters; reset on every start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub wins: u32,
    pub losses: u32,
    /// Completed cycles since the last reset
    pub cycles: u32,
    pub cumulative_profit_pct: Decimal,
}

impl SessionStats {
    /// Count one completed cycle with `outcome`
    pub fn apply(&mut self, outcome: Outcome, settings: &SchedulerConfig) {
        self.cycles += 1;
        match outcome {
            Outcome::Strong => {
                self.wins += 1;
                self.cumulative_profit_pct += settings.win_profit_pct;
            }
            Outcome::Weak => {
                self.losses += 1;
                self.cumulative_profit_pct -= settings.loss_pct;
            }
            Outcome::Neutral => {}
        }
    }
}

/// Classification of one cycle's confirmation count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Strong,
    Weak,
    Neutral,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Strong => write!(f, "STRONG"),
            Outcome::Weak => write!(f, "WEAK"),
            Outcome::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// `>= strong` is strong, `>= weak` is weak, anything less is neutral
pub fn classify(count: usize, settings: &SchedulerConfig) -> Outcome {
    if count >= settings.strong_threshold {
        Outcome::Strong
    } else if count >= settings.weak_threshold {
        Outcome::Weak
    } else {
        Outcome::Neutral
    }
}

/// Admin message for one cycle
pub fn outcome_message(
    outcome: Outcome,
    config: &StrategyConfig,
    labels: &[ConfirmationLabel],
    count: usize,
    settings: &SchedulerConfig,
) -> String {
    match outcome {
        Outcome::Strong => format!(
            "🚀 STRONG SIGNAL DETECTED!\n\n💎 {}: {} confirmations\n📊 Strategy: {}\n✅ Signals: {}\n💰 Estimated: +{}% profit",
            config.symbol,
            count,
            config.strategy,
            join_labels(labels),
            settings.win_profit_pct
        ),
        Outcome::Weak => format!(
            "⚠️ WEAK CONFLUENCE\n\n💎 {}: {} signals only\n📊 Strategy: {}\n🔍 Signals: {}\n📉 Risk: -{}% potential loss",
            config.symbol,
            count,
            config.strategy,
            join_labels(labels),
            settings.loss_pct
        ),
        Outcome::Neutral => format!(
            "⏸️ WAITING FOR ALIGNMENT\n\n💎 {}: Only {} signals\n📊 Strategy: {}\n⏳ Monitoring market conditions...",
            config.symbol, count, config.strategy
        ),
    }
}

/// Everything the control surface and the loop share
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub running: bool,
    /// Identifies the loop allowed to mutate `stats`
    pub run_id: Option<Uuid>,
    pub config: StrategyConfig,
    pub stats: SessionStats,
}

impl SessionState {
    /// Whether `run_id` belongs to the live session
    pub fn is_current(&self, run_id: Uuid) -> bool {
        self.running && self.run_id == Some(run_id)
    }

    /// Whether `run_id` still owns `stats`. A stopped session keeps its id so
    /// a cycle already in flight can finish; a restart installs a new one.
    pub fn owns(&self, run_id: Uuid) -> bool {
        self.run_id == Some(run_id)
    }

    pub fn snapshot(&self) -> SessionStatus {
        SessionStatus {
            running: self.running,
            run_id: self.run_id,
            config: self.config.clone(),
            stats: self.stats.clone(),
        }
    }
}

/// Point-in-time view returned by `get_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub running: bool,
    pub run_id: Option<Uuid>,
    pub config: StrategyConfig,
    pub stats: SessionStats,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.running {
            return write!(
                f,
                "🛑 AUTO-TRADER STATUS: 🔴 STOPPED\n\n📊 Current Strategy: {}\n✅ Wins: {}\n❌ Losses: {}\n💰 Net PnL: {:.2}%",
                self.config.strategy,
                self.stats.wins,
                self.stats.losses,
                self.stats.cumulative_profit_pct
            );
        }

        write!(
            f,
            "🤖 AUTO-TRADER STATUS: 🟢 RUNNING\n\n📊 Strategy: {}\n💎 Pair: {}\n⏰ Timeframes: {}\n🎯 Leverage: {}x\n\n📈 PERFORMANCE:\n✅ Wins: {}\n❌ Losses: {}\n💰 Net PnL: {:.2}%",
            self.config.strategy,
            self.config.symbol,
            self.config.timeframes.join(", "),
            self.config.leverage,
            self.stats.wins,
            self.stats.losses,
            self.stats.cumulative_profit_pct
        )
    }
}
