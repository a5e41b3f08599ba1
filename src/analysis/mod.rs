//! Price-structure analysis
//!
//! Smart-money heuristics over a candle series:
//! - Order blocks
//! - Fair value gaps
//! - Break of structure

pub mod structure;


pub use structure::{
    break_of_structure, fair_value_gap_detected, order_block_detected, BOS_LOOKBACK,
    MIN_ORDER_BLOCK_CANDLES, ORDER_BLOCK_LOOKBACK,
};

use crate::types::CandleSeries;
use serde::{Deserialize, Serialize};

/// Structure detections for one series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSignals {
    pub order_block: bool,
    pub fair_value_gap: bool,
    pub break_of_structure: bool,
}

impl StructureSignals {
    /// Order block confirmed by a break of structure
    pub fn order_block_break(&self) -> bool {
        self.order_block && self.break_of_structure
    }
}

/// Run every structure detector over `series`
pub fn detect_structure(series: &CandleSeries) -> StructureSignals {
    StructureSignals {
        order_block: order_block_detected(series),
        fair_value_gap: fair_value_gap_detected(series),
        break_of_structure: break_of_structure(series),
    }
}
