//! Confluence Signal Bot
//!
//! Runs the auto-trader loop against Bybit market data and reports outcomes
//! over Telegram.

use clap::{Parser, Subcommand};
use confluence_bot::{
    config::Config,
    data::{BybitDataSource, DEFAULT_TIMEFRAME},
    notify::{NotificationSink, TelegramNotifier},
    paper::{classify, AutoTrader, AutoTraderConfig},
    storage::{JsonlTradeRecorder, TradeRecorder},
    strategy::{SignalStrategy, StrategyRegistry},
    types::{join_labels, tradable_count},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "confluence-bot")]
#[command(about = "Confluence signal engine with a paper auto-trader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the auto-trader until Ctrl-C
    Run {
        /// Trading pair, e.g. BTCUSDT
        #[arg(short, long)]
        symbol: String,
        /// Timeframes, primary first (e.g. 15m 1h)
        #[arg(short, long, num_args = 1.., default_value = "15m")]
        timeframes: Vec<String>,
        /// Leverage multiplier; "10" and "10x" are both accepted
        #[arg(short, long, value_parser = parse_leverage)]
        leverage: Option<u32>,
        /// Strategy identifier (quantum, momentum, breakout, meanreversion)
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Evaluate a symbol once and print the confirmations
    Analyze {
        symbol: String,
        #[arg(short, long, default_value = DEFAULT_TIMEFRAME)]
        timeframe: String,
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Show recent simulated trades
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Test Telegram notification
    TestNotify,
}

fn parse_leverage(value: &str) -> Result<u32, String> {
    value
        .trim()
        .trim_end_matches(['x', 'X'])
        .parse::<u32>()
        .map_err(|e| format!("invalid leverage '{}': {}", value, e))
        .and_then(|l| if l == 0 { Err("leverage must be positive".to_string()) } else { Ok(l) })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run {
            symbol,
            timeframes,
            leverage,
            strategy,
        } => run_trader(config, &symbol, timeframes, leverage, strategy).await,
        Commands::Analyze {
            symbol,
            timeframe,
            strategy,
        } => analyze_symbol(config, &symbol, &timeframe, strategy).await,
        Commands::History { limit } => show_history(config, limit).await,
        Commands::TestNotify => test_notify(config).await,
    }
}

fn build_notifier(config: &Config) -> TelegramNotifier {
    match &config.telegram {
        Some(tg) => TelegramNotifier::new(tg.bot_token.clone()),
        None => {
            tracing::warn!("Telegram not configured, notifications disabled");
            TelegramNotifier::disabled()
        }
    }
}

fn build_registry(config: &Config) -> anyhow::Result<StrategyRegistry> {
    let source = Arc::new(BybitDataSource::new(&config.market_data)?);
    Ok(StrategyRegistry::from_config(source, config))
}

async fn run_trader(
    config: Config,
    symbol: &str,
    timeframes: Vec<String>,
    leverage: Option<u32>,
    strategy: Option<String>,
) -> anyhow::Result<()> {
    tracing::info!("Starting confluence auto-trader");

    let registry = build_registry(&config)?;
    let notifier = Arc::new(build_notifier(&config));
    let recorder = Arc::new(JsonlTradeRecorder::new(&config.recorder.path));
    let trader = AutoTrader::new(
        AutoTraderConfig::from_config(&config),
        registry,
        notifier.clone(),
        recorder,
    );

    let leverage = leverage.unwrap_or(config.strategy.default_leverage);
    let strategy = strategy.unwrap_or_else(|| config.strategy.default.clone());

    let status = trader
        .start_session(symbol, &timeframes, leverage, Some(strategy.as_str()))
        .await?;
    println!("{}\n", status);

    let started = format!(
        "🚀 AUTO-TRADER STARTED!\n\n📊 Strategy: {}\n💎 Pair: {}\n⏰ Timeframes: {}\n🎯 Leverage: {}x\n\n⚡ Analyzing signals every {} seconds...",
        status.config.strategy,
        status.config.symbol,
        status.config.timeframes.join(", "),
        status.config.leverage,
        trader.config().scheduler.interval_secs
    );
    if let Err(e) = notifier.notify(&trader.config().admin_recipient, &started).await {
        tracing::warn!("Failed to send startup notification: {}", e);
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    trader.stop_session().await;
    println!("\n{}", trader.get_status());
    Ok(())
}

async fn analyze_symbol(
    config: Config,
    symbol: &str,
    timeframe: &str,
    strategy: Option<String>,
) -> anyhow::Result<()> {
    let registry = build_registry(&config)?;
    let strategy_id = strategy.unwrap_or_else(|| config.strategy.default.clone());
    let strategy = registry.select(&strategy_id);

    let symbol = symbol.trim().to_uppercase();
    let timeframes = vec![timeframe.trim().to_string()];
    let labels = strategy.evaluate(&symbol, &timeframes).await;

    let count = tradable_count(&labels);
    let outcome = classify(count, &config.scheduler);

    println!("\n📈 {} on {} ({})\n", strategy.kind(), symbol, timeframes[0]);
    if labels.is_empty() {
        println!("No confirmations");
    } else {
        println!("Confirmations: {}", join_labels(&labels));
    }
    println!("Count: {}", count);
    println!("Outcome: {}", outcome);

    Ok(())
}

async fn show_history(config: Config, limit: usize) -> anyhow::Result<()> {
    let recorder = JsonlTradeRecorder::new(&config.recorder.path);
    let records = recorder.recent(limit).await?;

    if records.is_empty() {
        println!("📭 No trades recorded in {}", recorder.path().display());
        return Ok(());
    }

    println!("\n📜 Last {} trades\n", records.len());
    for record in &records {
        println!(
            "  {} {} {} {} [{}] {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.action,
            record.amount,
            record.instrument,
            record.status,
            record.reference
        );
    }
    Ok(())
}

async fn test_notify(config: Config) -> anyhow::Result<()> {
    let tg_config = config
        .telegram
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Telegram not configured in config.toml"))?;

    let notifier = TelegramNotifier::new(tg_config.bot_token.clone());

    notifier
        .notify(
            &tg_config.admin_chat_id,
            "🧪 <b>Test Notification</b>\n\nIf you see this, Telegram integration is working!",
        )
        .await?;

    println!("✅ Test notification sent!");
    Ok(())
}
