//! Signal strategies
//!
//! Every strategy turns a symbol and its timeframes into an ordered list of
//! confirmation labels. The registry maps identifiers to implementations and
//! falls back to the confluence engine for anything it does not recognise.

pub mod confluence;
pub mod sampled;


pub use confluence::{ConfluenceEngine, ConfluenceSignals};
pub use sampled::SampledStrategy;

use crate::config::Config;
use crate::data::MarketDataSource;
use crate::types::ConfirmationLabel;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A confirmation generator
#[async_trait]
pub trait SignalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Ordered confirmations for `symbol`. Never fails; evaluation errors
    /// surface as the error sentinel label.
    async fn evaluate(&self, symbol: &str, timeframes: &[String]) -> Vec<ConfirmationLabel>;
}

/// Available strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Quantum,
    Momentum,
    Breakout,
    MeanReversion,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Quantum,
        StrategyKind::Momentum,
        StrategyKind::Breakout,
        StrategyKind::MeanReversion,
    ];

    /// Resolve an identifier. Unknown identifiers map to `Quantum`.
    pub fn from_id(id: &str) -> Self {
        let normalized: String = id
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "momentum" | "momentumscalper" | "momentumscalperv10" => StrategyKind::Momentum,
            "breakout" | "breakouthunter" | "breakouthunterv10" => StrategyKind::Breakout,
            "meanreversion" | "meanreversionv10" => StrategyKind::MeanReversion,
            _ => StrategyKind::Quantum,
        }
    }

    /// Short identifier used in commands and config
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::Quantum => "quantum",
            StrategyKind::Momentum => "momentum",
            StrategyKind::Breakout => "breakout",
            StrategyKind::MeanReversion => "meanreversion",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::Quantum => "Quantum Engine V2.0",
            StrategyKind::Momentum => "Momentum Scalper V1.0",
            StrategyKind::Breakout => "Breakout Hunter V1.0",
            StrategyKind::MeanReversion => "Mean Reversion V1.0",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<&str> for StrategyKind {
    fn from(id: &str) -> Self {
        Self::from_id(id)
    }
}

/// Strategy lookup by kind
pub struct StrategyRegistry {
    quantum: Arc<dyn SignalStrategy>,
    others: HashMap<StrategyKind, Arc<dyn SignalStrategy>>,
}

impl StrategyRegistry {
    /// Confluence engine plus the three sampled strategies.
    ///
    /// Each sampled strategy gets its own `StdRng` derived from `rng_seed`.
    pub fn new(source: Arc<dyn MarketDataSource>, candle_limit: usize, rng_seed: u64) -> Self {
        let quantum: Arc<dyn SignalStrategy> = Arc::new(ConfluenceEngine::new(source, candle_limit));

        let mut registry = Self {
            quantum,
            others: HashMap::new(),
        };

        for (offset, kind) in [
            StrategyKind::Momentum,
            StrategyKind::Breakout,
            StrategyKind::MeanReversion,
        ]
        .into_iter()
        .enumerate()
        {
            let rng = StdRng::seed_from_u64(rng_seed.wrapping_add(offset as u64));
            if let Some(strategy) = SampledStrategy::for_kind(kind, rng) {
                registry.others.insert(kind, Arc::new(strategy));
            }
        }

        registry
    }

    /// Build from config; an unset seed draws one from the thread RNG
    pub fn from_config(source: Arc<dyn MarketDataSource>, config: &Config) -> Self {
        let seed = config.strategy.rng_seed.unwrap_or_else(rand::random);
        Self::new(source, config.market_data.limit, seed)
    }

    /// Replace the implementation registered for `strategy.kind()`
    pub fn with_strategy(mut self, strategy: Arc<dyn SignalStrategy>) -> Self {
        match strategy.kind() {
            StrategyKind::Quantum => self.quantum = strategy,
            kind => {
                self.others.insert(kind, strategy);
            }
        }
        self
    }

    /// Strategy for `kind`, or the confluence engine if none is registered
    pub fn get(&self, kind: StrategyKind) -> Arc<dyn SignalStrategy> {
        self.others
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.quantum.clone())
    }

    /// Strategy for a string identifier
    pub fn select(&self, id: &str) -> Arc<dyn SignalStrategy> {
        self.get(StrategyKind::from_id(id))
    }
}
