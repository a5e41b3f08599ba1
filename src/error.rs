//! Error types

use thiserror::Error;

/// Bot error taxonomy
///
/// Nothing here is fatal to the process. Data and evaluation failures degrade
/// to synthetic data or a sentinel label; configuration errors reject the
/// triggering request.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient history: need {needed} candles, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Trade recorder error: {0}")]
    Recorder(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, BotError>;
