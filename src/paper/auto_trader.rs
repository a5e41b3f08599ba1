//! Auto trader with a cancellable scheduler loop
//!
//! Wraps one session with:
//! - Start / stop / status / strategy-switch control surface
//! - A background tokio task evaluating the active strategy every interval
//! - Outcome notifications to the admin recipient
//! - Simulated trade records on strong outcomes

use super::session::{
    classify, outcome_message, Outcome, SessionState, SessionStatus, StrategyConfig,
};
use crate::config::{Config, SchedulerConfig};
use crate::error::{BotError, Result};
use crate::notify::NotificationSink;
use crate::storage::{TradeRecord, TradeRecorder};
use crate::strategy::{SignalStrategy, StrategyKind, StrategyRegistry};
use crate::types::tradable_count;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Auto trader configuration
#[derive(Debug, Clone)]
pub struct AutoTraderConfig {
    pub scheduler: SchedulerConfig,
    /// Base order size; the recorded amount is this times leverage
    pub order_amount: Decimal,
    /// Recipient of cycle notifications
    pub admin_recipient: String,
}

impl Default for AutoTraderConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            order_amount: dec!(0.01),
            admin_recipient: String::new(),
        }
    }
}

impl AutoTraderConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scheduler: config.scheduler.clone(),
            order_amount: config.recorder.order_amount,
            admin_recipient: config
                .telegram
                .as_ref()
                .map(|tg| tg.admin_chat_id.clone())
                .unwrap_or_default(),
        }
    }
}

/// State shared between the control surface and the loop
struct Shared {
    config: AutoTraderConfig,
    state: Mutex<SessionState>,
    registry: StrategyRegistry,
    notifier: Arc<dyn NotificationSink>,
    recorder: Arc<dyn TradeRecorder>,
}

struct LoopHandle {
    run_id: Uuid,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns at most one running session
pub struct AutoTrader {
    shared: Arc<Shared>,
    task: tokio::sync::Mutex<Option<LoopHandle>>,
}

impl AutoTrader {
    pub fn new(
        config: AutoTraderConfig,
        registry: StrategyRegistry,
        notifier: Arc<dyn NotificationSink>,
        recorder: Arc<dyn TradeRecorder>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(SessionState::default()),
                registry,
                notifier,
                recorder,
            }),
            task: tokio::sync::Mutex::new(None),
        }
    }

    /// Start a session, replacing any session already running.
    ///
    /// The symbol is upper-cased; blank timeframes are dropped. `strategy_id`
    /// of `None` keeps the currently selected strategy.
    pub async fn start_session(
        &self,
        symbol: &str,
        timeframes: &[String],
        leverage: u32,
        strategy_id: Option<&str>,
    ) -> Result<SessionStatus> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(BotError::Configuration("symbol must not be empty".to_string()));
        }

        let timeframes: Vec<String> = timeframes
            .iter()
            .map(|tf| tf.trim().to_string())
            .filter(|tf| !tf.is_empty())
            .collect();
        if timeframes.is_empty() {
            return Err(BotError::Configuration(
                "at least one timeframe is required".to_string(),
            ));
        }

        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            info!("Replacing running session {}", previous.run_id);
            self.shutdown_loop(previous).await;
        }

        let run_id = Uuid::new_v4();
        let status = {
            let mut state = self.shared.state.lock();
            let strategy = strategy_id
                .map(StrategyKind::from_id)
                .unwrap_or(state.config.strategy);

            state.running = true;
            state.run_id = Some(run_id);
            state.config = StrategyConfig {
                symbol,
                timeframes,
                leverage,
                strategy,
            };
            state.stats = Default::default();
            state.snapshot()
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let shared = self.shared.clone();
        let handle = tokio::spawn(run_loop(shared, run_id, shutdown_rx));
        *task = Some(LoopHandle {
            run_id,
            shutdown,
            handle,
        });

        info!(
            "Auto-trader started [{}]: {} {:?} {}x using {}",
            run_id,
            status.config.symbol,
            status.config.timeframes,
            status.config.leverage,
            status.config.strategy
        );
        Ok(status)
    }

    /// Stop the running session and wait for its loop to exit.
    ///
    /// Returns `false` if nothing was running.
    pub async fn stop_session(&self) -> bool {
        let mut task = self.task.lock().await;
        let Some(previous) = task.take() else {
            debug!("Stop requested with no session running");
            return false;
        };

        self.shutdown_loop(previous).await;

        let stats = self.shared.state.lock().stats.clone();
        info!(
            "Auto-trader stopped: {} wins, {} losses, {}% over {} cycles",
            stats.wins, stats.losses, stats.cumulative_profit_pct, stats.cycles
        );
        true
    }

    async fn shutdown_loop(&self, previous: LoopHandle) {
        {
            let mut state = self.shared.state.lock();
            if state.run_id == Some(previous.run_id) {
                state.running = false;
            }
        }
        let _ = previous.shutdown.send(true);

        if let Err(e) = previous.handle.await {
            error!("Scheduler loop {} ended abnormally: {}", previous.run_id, e);
        }
    }

    pub fn get_status(&self) -> SessionStatus {
        self.shared.state.lock().snapshot()
    }

    /// Switch strategy; a running loop picks it up on its next cycle
    pub fn set_strategy(&self, strategy_id: &str) -> StrategyKind {
        let kind = StrategyKind::from_id(strategy_id);
        self.shared.state.lock().config.strategy = kind;
        info!("Strategy set to {}", kind);
        kind
    }

    pub fn config(&self) -> &AutoTraderConfig {
        &self.shared.config
    }
}

impl Drop for AutoTrader {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.try_lock() {
            if let Some(previous) = task.take() {
                self.shared.state.lock().running = false;
                let _ = previous.shutdown.send(true);
            }
        }
    }
}

async fn run_loop(shared: Arc<Shared>, run_id: Uuid, mut shutdown: watch::Receiver<bool>) {
    let interval = Duration::from_secs(shared.config.scheduler.interval_secs);
    debug!("Scheduler loop {} running every {:?}", run_id, interval);

    loop {
        let config = {
            let state = shared.state.lock();
            if !state.is_current(run_id) {
                break;
            }
            state.config.clone()
        };
        if *shutdown.borrow() {
            break;
        }

        run_cycle(&shared, run_id, config).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }

    debug!("Scheduler loop {} exited", run_id);
}

/// One evaluate / classify / update / notify pass. Never fails; problems are
/// logged and the cycle is abandoned.
async fn run_cycle(shared: &Shared, run_id: Uuid, config: StrategyConfig) {
    let strategy = shared.registry.get(config.strategy);
    let symbol = config.symbol.clone();
    let timeframes = config.timeframes.clone();

    // Own task so a panicking strategy surfaces as a JoinError
    let evaluation = tokio::spawn(async move { strategy.evaluate(&symbol, &timeframes).await });
    let labels = match evaluation.await {
        Ok(labels) => labels,
        Err(e) => {
            error!("Auto trade cycle failed for {}: {}", config.symbol, e);
            return;
        }
    };

    let settings = &shared.config.scheduler;
    let count = tradable_count(&labels);
    let outcome = classify(count, settings);

    {
        let mut state = shared.state.lock();
        if !state.owns(run_id) {
            debug!("Discarding result of superseded run {}", run_id);
            return;
        }
        state.stats.apply(outcome, settings);
    }

    info!("{} {}: {} confirmations ({})", config.symbol, outcome, count, config.strategy);

    let message = outcome_message(outcome, &config, &labels, count, settings);
    if let Err(e) = shared
        .notifier
        .notify(&shared.config.admin_recipient, &message)
        .await
    {
        warn!("Failed to send cycle notification: {}", e);
    }

    if outcome == Outcome::Strong {
        let amount = shared.config.order_amount * Decimal::from(config.leverage);
        let record = TradeRecord::demo_buy(&config.symbol, amount, run_id.to_string());
        if let Err(e) = shared.recorder.record(record).await {
            warn!("Failed to record trade for {}: {}", config.symbol, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockMarketDataSource;
    use crate::storage::MemoryTradeRecorder;
    use crate::testing::{FixedStrategy, RecordingNotifier};

    struct Harness {
        trader: AutoTrader,
        notifier: Arc<RecordingNotifier>,
        recorder: Arc<MemoryTradeRecorder>,
    }

    fn harness_with(strategies: Vec<Arc<dyn SignalStrategy>>, notifier: RecordingNotifier) -> Harness {
        let mut registry = StrategyRegistry::new(Arc::new(MockMarketDataSource::new()), 100, 1);
        for strategy in strategies {
            registry = registry.with_strategy(strategy);
        }

        let notifier = Arc::new(notifier);
        let recorder = Arc::new(MemoryTradeRecorder::new());
        let config = AutoTraderConfig {
            admin_recipient: "admin".to_string(),
            ..Default::default()
        };
        let trader = AutoTrader::new(config, registry, notifier.clone(), recorder.clone());

        Harness {
            trader,
            notifier,
            recorder,
        }
    }

    fn harness(label_count: usize) -> Harness {
        harness_with(
            vec![Arc::new(FixedStrategy::with_count(StrategyKind::Quantum, label_count))],
            RecordingNotifier::new(),
        )
    }

    fn tf(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_cycle_deltas() {
        let cases = [
            (0, 0, 0, dec!(0)),
            (2, 0, 0, dec!(0)),
            (3, 0, 1, dec!(-8)),
            (5, 0, 1, dec!(-8)),
            (6, 1, 0, dec!(35)),
            (8, 1, 0, dec!(35)),
        ];

        for (count, wins, losses, pnl) in cases {
            let h = harness(count);
            h.trader
                .start_session("btcusdt", &tf(&["15m"]), 10, Some("quantum"))
                .await
                .unwrap();
            h.notifier.wait_for(1).await;
            assert!(h.trader.stop_session().await);

            let stats = h.trader.get_status().stats;
            assert_eq!(stats.cycles, 1, "count {count}");
            assert_eq!(stats.wins, wins, "count {count}");
            assert_eq!(stats.losses, losses, "count {count}");
            assert_eq!(stats.cumulative_profit_pct, pnl, "count {count}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_repeat_on_interval() {
        let h = harness(6);
        h.trader
            .start_session("BTCUSDT", &tf(&["15m", "1h"]), 10, None)
            .await
            .unwrap();
        h.notifier.wait_for(3).await;
        h.trader.stop_session().await;

        let status = h.trader.get_status();
        assert!(!status.running);
        assert_eq!(status.stats.cycles, 3);
        assert_eq!(status.stats.wins, 3);
        assert_eq!(status.stats.cumulative_profit_pct, dec!(105));
        assert!(status.stats.wins + status.stats.losses <= status.stats.cycles);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_go_to_admin() {
        let h = harness(4);
        h.trader
            .start_session("ETHUSDT", &tf(&["1h"]), 5, None)
            .await
            .unwrap();
        h.notifier.wait_for(1).await;
        h.trader.stop_session().await;

        let messages = h.notifier.messages();
        assert_eq!(messages[0].0, "admin");
        assert!(messages[0].1.contains("WEAK CONFLUENCE"));
        assert!(messages[0].1.contains("ETHUSDT"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_strong_outcome_records_demo_trade() {
        let h = harness(7);
        let status = h
            .trader
            .start_session("SOLUSDT", &tf(&["15m"]), 20, None)
            .await
            .unwrap();
        h.notifier.wait_for(1).await;
        h.trader.stop_session().await;

        let records = h.recorder.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "BUY");
        assert_eq!(records[0].instrument, "SOLUSDT");
        assert_eq!(records[0].amount, dec!(0.20));
        assert_eq!(records[0].status, "DEMO");
        assert_eq!(Some(records[0].reference.clone()), status.run_id.map(|id| id.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_weak_outcome_records_nothing() {
        let h = harness(3);
        h.trader
            .start_session("SOLUSDT", &tf(&["15m"]), 20, None)
            .await
            .unwrap();
        h.notifier.wait_for(2).await;
        h.trader.stop_session().await;
        assert!(h.recorder.is_empty());
    }

    #[tokio::test]
    async fn test_start_rejects_empty_symbol_or_timeframes() {
        let h = harness(0);

        let err = h.trader.start_session("  ", &tf(&["15m"]), 10, None).await;
        assert!(matches!(err, Err(BotError::Configuration(_))));

        let err = h.trader.start_session("BTCUSDT", &[], 10, None).await;
        assert!(matches!(err, Err(BotError::Configuration(_))));

        let err = h.trader.start_session("BTCUSDT", &tf(&[" ", ""]), 10, None).await;
        assert!(matches!(err, Err(BotError::Configuration(_))));

        assert!(!h.trader.get_status().running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_not_running_is_noop() {
        let h = harness(6);
        assert!(!h.trader.stop_session().await);
        assert!(!h.trader.get_status().running);

        h.trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, None)
            .await
            .unwrap();
        h.notifier.wait_for(2).await;
        assert!(h.trader.stop_session().await);
        let before = h.trader.get_status();
        assert_eq!(before.stats.wins, 2);

        assert!(!h.trader.stop_session().await);
        let after = h.trader.get_status();
        assert!(!after.running);
        assert_eq!(after.stats, before.stats);
        assert_eq!(h.notifier.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_cycle_complete() {
        let strategy = FixedStrategy::with_count(StrategyKind::Quantum, 6)
            .delayed(Duration::from_secs(3));
        let h = harness_with(vec![Arc::new(strategy)], RecordingNotifier::new());

        h.trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, None)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.notifier.count(), 0);

        assert!(h.trader.stop_session().await);

        let status = h.trader.get_status();
        assert!(!status.running);
        assert_eq!(status.stats.cycles, 1);
        assert_eq!(status.stats.wins, 1);
        assert_eq!(h.notifier.count(), 1);
        assert_eq!(h.recorder.len(), 1);

        // No further cycle after the stop
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(h.trader.get_status().stats.cycles, 1);
        assert_eq!(h.notifier.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_loop_and_resets_stats() {
        let h = harness(6);
        let first = h
            .trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, None)
            .await
            .unwrap();
        h.notifier.wait_for(2).await;
        assert_eq!(h.trader.get_status().stats.wins, 2);

        let second = h
            .trader
            .start_session("ETHUSDT", &tf(&["1h"]), 3, None)
            .await
            .unwrap();
        assert_ne!(first.run_id, second.run_id);

        let status = h.trader.get_status();
        assert!(status.running);
        assert_eq!(status.config.symbol, "ETHUSDT");
        assert_eq!(status.stats, Default::default());

        h.notifier.wait_for(3).await;
        h.trader.stop_session().await;

        let status = h.trader.get_status();
        assert_eq!(status.stats.wins, 1);
        assert_eq!(status.stats.cycles, 1);

        let last = h.notifier.messages().pop().unwrap();
        assert!(last.1.contains("ETHUSDT"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_strategy_applies_next_cycle() {
        let h = harness_with(
            vec![
                Arc::new(FixedStrategy::with_count(StrategyKind::Quantum, 0)),
                Arc::new(FixedStrategy::with_count(StrategyKind::Momentum, 6)),
            ],
            RecordingNotifier::new(),
        );

        h.trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, Some("quantum"))
            .await
            .unwrap();
        h.notifier.wait_for(1).await;

        assert_eq!(h.trader.set_strategy("momentum"), StrategyKind::Momentum);
        h.notifier.wait_for(2).await;
        h.trader.stop_session().await;

        let status = h.trader.get_status();
        assert_eq!(status.config.strategy, StrategyKind::Momentum);
        assert_eq!(status.stats.cycles, 2);
        assert_eq!(status.stats.wins, 1);
    }

    #[tokio::test]
    async fn test_set_strategy_unknown_falls_back() {
        let h = harness(0);
        assert_eq!(h.trader.set_strategy("does-not-exist"), StrategyKind::Quantum);
        assert_eq!(h.trader.get_status().config.strategy, StrategyKind::Quantum);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_cycle_does_not_stop_loop() {
        let strategy = Arc::new(FixedStrategy::with_count(StrategyKind::Quantum, 6).panicking_once());
        let shared: Arc<dyn SignalStrategy> = strategy.clone();
        let h = harness_with(vec![shared], RecordingNotifier::new());

        h.trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, None)
            .await
            .unwrap();
        h.notifier.wait_for(1).await;
        assert!(h.trader.get_status().running);
        h.trader.stop_session().await;

        let stats = h.trader.get_status().stats;
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.wins, 1);
        assert_eq!(strategy.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_failure_does_not_stop_loop() {
        let h = harness_with(
            vec![Arc::new(FixedStrategy::with_count(StrategyKind::Quantum, 6))],
            RecordingNotifier::failing(),
        );

        h.trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, None)
            .await
            .unwrap();
        h.notifier.wait_for(2).await;
        h.trader.stop_session().await;

        assert_eq!(h.trader.get_status().stats.wins, 2);
        assert_eq!(h.recorder.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_sentinel_counts_as_neutral() {
        let h = harness_with(
            vec![Arc::new(FixedStrategy::new(
                StrategyKind::Quantum,
                &[crate::types::ERROR_LABEL],
            ))],
            RecordingNotifier::new(),
        );

        h.trader
            .start_session("BTCUSDT", &tf(&["15m"]), 10, None)
            .await
            .unwrap();
        h.notifier.wait_for(1).await;
        h.trader.stop_session().await;

        let stats = h.trader.get_status().stats;
        assert_eq!(stats.cycles, 1);
        assert_eq!((stats.wins, stats.losses), (0, 0));
        assert!(h.notifier.messages()[0].1.contains("WAITING"));
    }
}
