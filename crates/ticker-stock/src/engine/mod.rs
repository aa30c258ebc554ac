//! Indicator engine
//!
//! Fetches a price series from the market data provider and applies one of
//! the six indicator functions to it. Every failure, from the fetch or the
//! math, comes back as a [`ComputationError`] naming the function and ticker;
//! nothing escapes this boundary as a panic.

pub mod function;
pub mod result;

pub use function::FunctionName;
pub use result::{ComputationError, IndicatorResult, IndicatorValue, format_float};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::{MarketDataProvider, Period, PriceSeries};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::indicators;

/// Lookback used by RSI and MACD regardless of configuration
const MOMENTUM_PERIOD: Period = Period::OneYear;

/// Runs indicator functions against a market data provider
#[derive(Clone)]
pub struct IndicatorEngine {
    provider: Arc<dyn MarketDataProvider>,
    config: Arc<StockConfig>,
}

impl IndicatorEngine {
    /// Create a new engine
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: Arc<StockConfig>) -> Self {
        Self { provider, config }
    }

    /// Run `function` for `ticker` with the configured defaults
    #[instrument(skip(self), fields(provider = %self.provider.name()))]
    pub async fn run(&self, function: FunctionName, ticker: &str) -> IndicatorResult {
        let cfg = &self.config;
        let result = match function {
            FunctionName::Price => self.get_stock_price(ticker, cfg.default_period).await,
            FunctionName::Volume => self.get_stock_volume(ticker).await,
            FunctionName::Sma => {
                self.calculate_sma(ticker, cfg.default_period, cfg.sma_window)
                    .await
            }
            FunctionName::Ema => {
                self.calculate_ema(ticker, cfg.default_period, cfg.ema_window)
                    .await
            }
            FunctionName::Rsi => self.calculate_rsi(ticker, cfg.rsi_window).await,
            FunctionName::Macd => {
                self.calculate_macd(
                    ticker,
                    cfg.macd_short_window,
                    cfg.macd_long_window,
                    cfg.macd_signal_window,
                )
                .await
            }
        };

        match &result {
            Ok(value) => debug!("{} for {} = {}", function, ticker, value),
            Err(e) => debug!("{} failed: {}", function, e),
        }
        result
    }

    /// Most recent closing price over `period`
    pub async fn get_stock_price(&self, ticker: &str, period: Period) -> IndicatorResult {
        self.compute(FunctionName::Price, ticker, period, |series| {
            series
                .last_close()
                .map(IndicatorValue::Scalar)
                .ok_or_else(|| no_data(series))
        })
        .await
    }

    /// Volume for every bar of the full available history
    pub async fn get_stock_volume(&self, ticker: &str) -> IndicatorResult {
        self.compute(FunctionName::Volume, ticker, Period::Max, |series| {
            Ok(IndicatorValue::Volume(series.volume_by_timestamp()))
        })
        .await
    }

    /// Latest simple moving average of close over `window` bars
    pub async fn calculate_sma(&self, ticker: &str, period: Period, window: usize) -> IndicatorResult {
        self.compute(FunctionName::Sma, ticker, period, |series| {
            latest_scalar(series, &indicators::sma(&series.closes(), window)?)
        })
        .await
    }

    /// Latest exponential moving average of close with span `window`
    pub async fn calculate_ema(&self, ticker: &str, period: Period, window: usize) -> IndicatorResult {
        self.compute(FunctionName::Ema, ticker, period, |series| {
            latest_scalar(series, &indicators::ema(&series.closes(), window)?)
        })
        .await
    }

    /// Latest RSI over one year of closes
    pub async fn calculate_rsi(&self, ticker: &str, window: usize) -> IndicatorResult {
        self.compute(FunctionName::Rsi, ticker, MOMENTUM_PERIOD, |series| {
            latest_scalar(series, &indicators::rsi(&series.closes(), window)?)
        })
        .await
    }

    /// Latest MACD histogram value over one year of closes
    pub async fn calculate_macd(
        &self,
        ticker: &str,
        short_window: usize,
        long_window: usize,
        signal_window: usize,
    ) -> IndicatorResult {
        self.compute(FunctionName::Macd, ticker, MOMENTUM_PERIOD, |series| {
            let histogram = indicators::macd_histogram(
                &series.closes(),
                short_window,
                long_window,
                signal_window,
            )?;
            latest_scalar(series, &histogram)
        })
        .await
    }

    /// Fetch once, apply `calc`, and tag any failure with function and ticker
    async fn compute<F>(
        &self,
        function: FunctionName,
        ticker: &str,
        period: Period,
        calc: F,
    ) -> IndicatorResult
    where
        F: FnOnce(&PriceSeries) -> Result<IndicatorValue>,
    {
        let symbol = ticker.trim().to_uppercase();
        let outcome = match self.fetch(&symbol, period).await {
            Ok(series) => calc(&series),
            Err(e) => Err(e),
        };
        outcome.map_err(|source| ComputationError::new(function, ticker, source))
    }

    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        if symbol.is_empty() {
            return Err(StockError::InvalidSymbol(symbol.to_string()));
        }

        let series = self.provider.history(symbol, period).await?;
        if series.is_empty() {
            return Err(no_data(&series));
        }
        Ok(series)
    }
}

fn latest_scalar(series: &PriceSeries, values: &[f64]) -> Result<IndicatorValue> {
    indicators::latest(values)
        .map(IndicatorValue::Scalar)
        .ok_or_else(|| no_data(series))
}

fn no_data(series: &PriceSeries) -> StockError {
    StockError::DataUnavailable {
        symbol: series.symbol().to_string(),
        reason: "empty price series".to_string(),
    }
}
