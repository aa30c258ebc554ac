//! Market data providers

pub mod series;
pub mod yahoo;

pub use series::{Bar, Period, PriceSeries};
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;

use crate::error::Result;

/// Source of historical OHLCV data
///
/// Implementations perform one fetch per call and never cache.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch daily bars for `symbol` over `period`
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
