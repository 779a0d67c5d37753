use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::sources::binance;

/// Instruments watched when `SYMBOLS` is unset.
pub const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "SOLUSDT", "SUIUSDT", "ENSUSDT"];

/// Longest indicator window (SMA200).
pub const MIN_CANDLE_LIMIT: u32 = 200;

/// Largest page Binance serves for klines.
pub const MAX_CANDLE_LIMIT: u32 = 1000;

/// Cut-points used to turn indicator values into categorical tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    /// RSI above this is overbought (default: 70).
    pub rsi_overbought: f64,
    /// RSI below this is oversold (default: 30).
    pub rsi_oversold: f64,
    /// Stochastic %K above this is overbought (default: 80).
    pub stoch_overbought: f64,
    /// Stochastic %K below this is oversold (default: 20).
    pub stoch_oversold: f64,
    /// ADX above this is a strong trend (default: 25).
    pub adx_strong: f64,
    /// ADX below this is a weak trend (default: 20).
    pub adx_weak: f64,
    /// Volume above this multiple of the 20-bar mean is a spike (default: 1.5).
    pub volume_spike_multiplier: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            stoch_overbought: 80.0,
            stoch_oversold: 20.0,
            adx_strong: 25.0,
            adx_weak: 20.0,
            volume_spike_multiplier: 1.5,
        }
    }
}

impl SignalThresholds {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rsi_overbought: env_parse("RSI_OVERBOUGHT", defaults.rsi_overbought),
            rsi_oversold: env_parse("RSI_OVERSOLD", defaults.rsi_oversold),
            stoch_overbought: env_parse("STOCH_OVERBOUGHT", defaults.stoch_overbought),
            stoch_oversold: env_parse("STOCH_OVERSOLD", defaults.stoch_oversold),
            adx_strong: env_parse("ADX_STRONG", defaults.adx_strong),
            adx_weak: env_parse("ADX_WEAK", defaults.adx_weak),
            volume_spike_multiplier: env_parse(
                "VOLUME_SPIKE_MULTIPLIER",
                defaults.volume_spike_multiplier,
            ),
        }
    }

    /// Reject inverted or out-of-range cut-points.
    pub fn validate(&self) -> Result<()> {
        let pairs = [
            ("RSI", self.rsi_oversold, self.rsi_overbought),
            ("STOCH", self.stoch_oversold, self.stoch_overbought),
            ("ADX", self.adx_weak, self.adx_strong),
        ];

        for (name, low, high) in pairs {
            for value in [low, high] {
                if !(0.0..=100.0).contains(&value) {
                    return Err(AppError::Config(format!(
                        "{} threshold {} is outside [0, 100]",
                        name, value
                    )));
                }
            }
            if low >= high {
                return Err(AppError::Config(format!(
                    "{} thresholds are inverted: low {} >= high {}",
                    name, low, high
                )));
            }
        }

        if !(self.volume_spike_multiplier.is_finite() && self.volume_spike_multiplier > 0.0) {
            return Err(AppError::Config(format!(
                "volume spike multiplier must be positive, got {}",
                self.volume_spike_multiplier
            )));
        }

        Ok(())
    }
}

/// Telegram bot credentials.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather.
    pub bot_token: String,
    /// Chat receiving the alerts.
    pub chat_id: String,
    /// Bot API base URL.
    pub api_url: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Instruments to monitor, upper case.
    pub symbols: Vec<String>,
    /// Kline interval passed to the candle source (e.g. "1h").
    pub interval: String,
    /// Candles requested per pass.
    pub candle_limit: u32,
    /// Seconds between monitor passes.
    pub poll_interval_secs: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Binance REST base URL.
    pub binance_api_url: String,
    /// Binance API key (optional, public endpoints work without).
    pub binance_api_key: Option<String>,
    /// Telegram delivery. None falls back to logging.
    pub telegram: Option<TelegramConfig>,
    /// Attach a candlestick chart to each alert.
    pub send_charts: bool,
    /// Token classification cut-points.
    pub thresholds: SignalThresholds,
}

impl Config {
    pub fn from_env() -> Self {
        let symbols = env::var("SYMBOLS")
            .ok()
            .map(|s| parse_symbols(&s))
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

        // Telegram needs both the token and the chat id.
        let telegram = match (
            non_empty_var("TELEGRAM_BOT_TOKEN"),
            non_empty_var("TELEGRAM_CHAT_ID"),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_url: env::var("TELEGRAM_API_URL")
                    .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            }),
            _ => None,
        };

        Self {
            symbols,
            interval: env::var("KLINE_INTERVAL").unwrap_or_else(|_| "1h".to_string()),
            candle_limit: env_parse("CANDLE_LIMIT", MIN_CANDLE_LIMIT),
            poll_interval_secs: env_parse("POLL_INTERVAL_SECS", 600),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 10),
            binance_api_url: env::var("BINANCE_API_URL")
                .unwrap_or_else(|_| binance::DEFAULT_API_URL.to_string()),
            binance_api_key: non_empty_var("BINANCE_API_KEY"),
            telegram,
            send_charts: env_parse("SEND_CHARTS", true),
            thresholds: SignalThresholds::from_env(),
        }
    }

    /// Check the settings before the monitor starts.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(AppError::Config("no symbols configured".to_string()));
        }

        if !(MIN_CANDLE_LIMIT..=MAX_CANDLE_LIMIT).contains(&self.candle_limit) {
            return Err(AppError::Config(format!(
                "candle limit {} must be between {} and {}",
                self.candle_limit, MIN_CANDLE_LIMIT, MAX_CANDLE_LIMIT
            )));
        }

        if self.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "poll interval must be at least one second".to_string(),
            ));
        }

        self.thresholds.validate()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Split a comma list into trimmed, upper-case, de-duplicated symbols.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
