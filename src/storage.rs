//! Trade history
//!
//! Append-only record of simulated executions. The JSONL recorder writes one
//! JSON object per line; the memory recorder backs tests and dry runs.

use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Status written for simulated executions
pub const STATUS_DEMO: &str = "DEMO";

/// One executed (or simulated) trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub instrument: String,
    pub amount: Decimal,
    pub status: String,
    pub reference: String,
}

impl TradeRecord {
    /// Simulated BUY stamped now
    pub fn demo_buy(instrument: &str, amount: Decimal, reference: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action: "BUY".to_string(),
            instrument: instrument.to_string(),
            amount,
            status: STATUS_DEMO.to_string(),
            reference: reference.into(),
        }
    }
}

#[async_trait]
pub trait TradeRecorder: Send + Sync {
    /// Append one record
    async fn record(&self, record: TradeRecord) -> Result<()>;

    /// Last `limit` records in insertion order
    async fn recent(&self, limit: usize) -> Result<Vec<TradeRecord>>;
}

/// Appends records to a JSONL file
pub struct JsonlTradeRecorder {
    path: PathBuf,
}

impl JsonlTradeRecorder {
    /// `~` in `path` expands to the home directory
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).into_owned()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TradeRecorder for JsonlTradeRecorder {
    async fn record(&self, record: TradeRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| BotError::Recorder(format!("{}: {}", self.path.display(), e)))?;

        let line = serde_json::to_string(&record)?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;

        debug!("Recorded {} {} ({})", record.action, record.instrument, record.reference);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TradeRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records: Vec<TradeRecord> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed trade record: {}", e);
                    None
                }
            })
            .collect();

        let skip = records.len().saturating_sub(limit);
        Ok(records.into_iter().skip(skip).collect())
    }
}

/// In-memory recorder
#[derive(Default)]
pub struct MemoryTradeRecorder {
    records: Mutex<Vec<TradeRecord>>,
}

impl MemoryTradeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl TradeRecorder for MemoryTradeRecorder {
    async fn record(&self, record: TradeRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TradeRecord>> {
        let records = self.records.lock();
        let skip = records.len().saturating_sub(limit);
        Ok(records[skip..].to_vec())
    }
}
