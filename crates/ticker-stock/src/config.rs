//! Configuration for the stock chat

use crate::api::Period;
use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use ticker_llm::Sampling;
use ticker_utils::{env_parse, env_var};

/// Tickers the comparison resolver looks for in an utterance
pub const DEFAULT_KNOWN_TICKERS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "TSLA", "AMZN"];

/// Chat model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// Configuration for indicator defaults and explanation requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Candidate second tickers for comparisons, in scan order
    pub known_tickers: Vec<String>,

    /// Lookback for price, SMA and EMA
    pub default_period: Period,

    pub sma_window: usize,
    pub ema_window: usize,
    pub rsi_window: usize,

    pub macd_short_window: usize,
    pub macd_long_window: usize,
    pub macd_signal_window: usize,

    /// Model name sent with every completion request
    pub model: String,

    /// Completion length cap
    pub max_tokens: u32,

    /// Sampling temperature, 0.0 to 2.0
    pub temperature: f32,

    /// Sequences that end a completion early
    pub stop_sequences: Vec<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        let sampling = Sampling::default();
        Self {
            known_tickers: DEFAULT_KNOWN_TICKERS.iter().map(ToString::to_string).collect(),
            default_period: Period::OneYear,
            sma_window: 50,
            ema_window: 50,
            rsi_window: 14,
            macd_short_window: 12,
            macd_long_window: 26,
            macd_signal_window: 9,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            stop_sequences: sampling.stop,
        }
    }
}

impl StockConfig {
    /// Generation limits for explanation requests
    pub fn sampling(&self) -> Sampling {
        Sampling {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stop: self.stop_sequences.clone(),
        }
    }

    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Defaults overridden by `OPENAI_MODEL` and the `TICKER_*` variables
    pub fn from_env() -> Result<Self> {
        StockConfig::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.known_tickers.is_empty() {
            return Err(StockError::ConfigError(
                "known_tickers must not be empty".to_string(),
            ));
        }

        if self.known_tickers.iter().any(|t| t.trim().is_empty()) {
            return Err(StockError::ConfigError(
                "known_tickers must not contain blank entries".to_string(),
            ));
        }

        for (name, window) in [
            ("sma_window", self.sma_window),
            ("ema_window", self.ema_window),
            ("rsi_window", self.rsi_window),
            ("macd_short_window", self.macd_short_window),
            ("macd_long_window", self.macd_long_window),
            ("macd_signal_window", self.macd_signal_window),
        ] {
            if window == 0 {
                return Err(StockError::ConfigError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.macd_short_window >= self.macd_long_window {
            return Err(StockError::ConfigError(format!(
                "macd_short_window ({}) must be less than macd_long_window ({})",
                self.macd_short_window, self.macd_long_window
            )));
        }

        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(StockError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    known_tickers: Option<Vec<String>>,
    default_period: Option<Period>,
    sma_window: Option<usize>,
    ema_window: Option<usize>,
    rsi_window: Option<usize>,
    macd_windows: Option<(usize, usize, usize)>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl StockConfigBuilder {
    /// Set the tickers recognised as comparison targets
    pub fn known_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_tickers = Some(
            tickers
                .into_iter()
                .map(|t| t.as_ref().trim().to_uppercase())
                .collect(),
        );
        self
    }

    /// Set the lookback for price, SMA and EMA
    pub fn default_period(mut self, period: Period) -> Self {
        self.default_period = Some(period);
        self
    }

    pub fn sma_window(mut self, window: usize) -> Self {
        self.sma_window = Some(window);
        self
    }

    pub fn ema_window(mut self, window: usize) -> Self {
        self.ema_window = Some(window);
        self
    }

    pub fn rsi_window(mut self, window: usize) -> Self {
        self.rsi_window = Some(window);
        self
    }

    /// Set the MACD short, long and signal spans
    pub fn macd_windows(mut self, short: usize, long: usize, signal: usize) -> Self {
        self.macd_windows = Some((short, long, signal));
        self
    }

    /// Set the completion model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the completion length cap
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Apply values found in the environment
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(list) = env_var("TICKER_KNOWN_TICKERS") {
            self = self.known_tickers(list.split(',').filter(|t| !t.trim().is_empty()));
        }
        if let Some(model) = env_var("OPENAI_MODEL") {
            self.model = Some(model);
        }
        if let Some(max_tokens) = env_parse("TICKER_MAX_TOKENS")? {
            self.max_tokens = Some(max_tokens);
        }
        if let Some(temperature) = env_parse("TICKER_TEMPERATURE")? {
            self.temperature = Some(temperature);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();
        let (macd_short_window, macd_long_window, macd_signal_window) =
            self.macd_windows.unwrap_or((
                defaults.macd_short_window,
                defaults.macd_long_window,
                defaults.macd_signal_window,
            ));

        let config = StockConfig {
            known_tickers: self.known_tickers.unwrap_or(defaults.known_tickers),
            default_period: self.default_period.unwrap_or(defaults.default_period),
            sma_window: self.sma_window.unwrap_or(defaults.sma_window),
            ema_window: self.ema_window.unwrap_or(defaults.ema_window),
            rsi_window: self.rsi_window.unwrap_or(defaults.rsi_window),
            macd_short_window,
            macd_long_window,
            macd_signal_window,
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            stop_sequences: defaults.stop_sequences,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.known_tickers, vec!["AAPL", "MSFT", "GOOGL", "TSLA", "AMZN"]);
        assert_eq!(config.default_period, Period::OneYear);
        assert_eq!(config.model, "gpt-3.5-turbo-0125");
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.stop_sequences, vec!["\n", "User:", "System:"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .known_tickers([" nvda", "amd "])
            .default_period("6mo".parse().unwrap())
            .sma_window(20)
            .macd_windows(5, 35, 5)
            .temperature(0.2)
            .build()
            .unwrap();

        assert_eq!(config.known_tickers, vec!["NVDA", "AMD"]);
        assert_eq!(config.default_period, Period::SixMonths);
        assert_eq!(config.sma_window, 20);
        assert_eq!(config.ema_window, 50);
        assert_eq!(config.macd_long_window, 35);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(StockConfig::builder().known_tickers(Vec::<String>::new()).build().is_err());
        assert!(StockConfig::builder().rsi_window(0).build().is_err());
        assert!(StockConfig::builder().macd_windows(26, 12, 9).build().is_err());
        assert!(StockConfig::builder().max_tokens(0).build().is_err());
        assert!(StockConfig::builder().temperature(2.5).build().is_err());

        let err = StockConfig::builder().ema_window(0).build().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: ema_window must be greater than 0");
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_with_env() {
        // SAFETY: these variables are only touched by this test
        unsafe {
            std::env::set_var("TICKER_KNOWN_TICKERS", "aapl, nflx,,");
            std::env::set_var("TICKER_MAX_TOKENS", "300");
        }
        let config = StockConfig::builder().with_env().unwrap().build().unwrap();
        assert_eq!(config.known_tickers, vec!["AAPL", "NFLX"]);
        assert_eq!(config.max_tokens, 300);

        unsafe {
            std::env::set_var("TICKER_MAX_TOKENS", "lots");
        }
        let err = StockConfig::builder().with_env().unwrap_err();
        assert!(matches!(err, StockError::ConfigError(msg) if msg.contains("TICKER_MAX_TOKENS")));

        unsafe {
            std::env::remove_var("TICKER_KNOWN_TICKERS");
            std::env::remove_var("TICKER_MAX_TOKENS");
        }
    }
}
