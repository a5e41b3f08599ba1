//! Test doubles for the scheduler seams

use crate::error::{BotError, Result};
use crate::notify::NotificationSink;
use crate::strategy::{SignalStrategy, StrategyKind};
use crate::types::ConfirmationLabel;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Strategy returning the same labels every call
pub struct FixedStrategy {
    kind: StrategyKind,
    labels: Vec<ConfirmationLabel>,
    calls: AtomicUsize,
    panic_on_first: bool,
    delay: Option<Duration>,
}

impl FixedStrategy {
    pub fn new(kind: StrategyKind, labels: &[&str]) -> Self {
        Self {
            kind,
            labels: labels.iter().map(|l| ConfirmationLabel::new(*l)).collect(),
            calls: AtomicUsize::new(0),
            panic_on_first: false,
            delay: None,
        }
    }

    /// `count` distinct labels
    pub fn with_count(kind: StrategyKind, count: usize) -> Self {
        let mut strategy = Self::new(kind, &[]);
        strategy.labels = (0..count)
            .map(|i| ConfirmationLabel::new(format!("Signal {}", i + 1)))
            .collect();
        strategy
    }

    /// Panic inside the first evaluation only
    pub fn panicking_once(mut self) -> Self {
        self.panic_on_first = true;
        self
    }

    /// Sleep for `delay` before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalStrategy for FixedStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn evaluate(&self, _symbol: &str, _timeframes: &[String]) -> Vec<ConfirmationLabel> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_first && call == 0 {
            panic!("strategy blew up");
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.labels.clone()
    }
}

/// Notifier that keeps every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records messages but reports every delivery as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }

    /// Poll until at least `n` messages arrived. Under paused tokio time the
    /// sleeps auto-advance the clock.
    pub async fn wait_for(&self, n: usize) {
        while self.count() < n {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, recipient: &str, text: &str) -> Result<()> {
        self.messages
            .lock()
            .push((recipient.to_string(), text.to_string()));
        if self.fail {
            return Err(BotError::Notify("delivery refused".to_string()));
        }
        Ok(())
    }
}
