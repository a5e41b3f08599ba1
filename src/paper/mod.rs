//! Paper auto-trading
//!
//! Runs the active strategy on a fixed interval against live (or synthetic)
//! market data and keeps score without placing real orders. Strong outcomes
//! are written to the trade history with status `DEMO`.

mod auto_trader;
mod session;

pub use auto_trader::{AutoTrader, AutoTraderConfig};
pub use session::{
    classify, outcome_message, Outcome, SessionState, SessionStats, SessionStatus, StrategyConfig,
};
