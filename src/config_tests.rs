//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_secs, 10);
        assert_eq!(config.strong_threshold, 6);
        assert_eq!(config.weak_threshold, 3);
        assert_eq!(config.win_profit_pct, dec!(35));
        assert_eq!(config.loss_pct, dec!(8));
    }

    #[test]
    fn test_market_data_config_defaults() {
        let config: MarketDataConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, "https://api.bybit.com");
        assert_eq!(config.category, "spot");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.limit, 100);
        assert_eq!(config.synthetic_seed, 42);
    }

    #[test]
    fn test_strategy_settings_defaults() {
        let config: StrategySettings = toml::from_str("").unwrap();
        assert_eq!(config.default, "quantum");
        assert!(config.rng_seed.is_none());
        assert_eq!(config.default_leverage, 10);
    }

    #[test]
    fn test_strategy_settings_with_seed() {
        let toml_str = r#"
default = "momentum"
rng_seed = 7
default_leverage = 5
"#;
        let config: StrategySettings = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default, "momentum");
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.default_leverage, 5);
    }

    #[test]
    fn test_telegram_config() {
        let toml_str = r#"
bot_token = "123:abc"
admin_chat_id = "12345"
"#;
        let config: TelegramConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.admin_chat_id, "12345");
    }

    #[test]
    fn test_full_config_from_toml() {
        let toml_str = r#"
[scheduler]
interval_secs = 5
win_profit_pct = "20"

[recorder]
path = "/tmp/trades.jsonl"

[telegram]
bot_token = "t"
admin_chat_id = "1"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scheduler.interval_secs, 5);
        assert_eq!(config.scheduler.win_profit_pct, dec!(20));
        assert_eq!(config.scheduler.strong_threshold, 6);
        assert_eq!(config.recorder.path, "/tmp/trades.jsonl");
        assert_eq!(config.recorder.order_amount, dec!(0.01));
        assert!(config.telegram.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.scheduler.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.scheduler.weak_threshold = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[market_data]\nlimit = 50\n\n[strategy]\ndefault = \"breakout\"").unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.market_data.limit, 50);
        assert_eq!(config.strategy.default, "breakout");
        assert_eq!(config.scheduler.interval_secs, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.market_data.base_url, "https://api.bybit.com");
        assert_eq!(config.recorder.path, "trade_history.jsonl");
    }
}
