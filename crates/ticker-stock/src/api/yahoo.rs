//! Daily history from Yahoo Finance

use async_trait::async_trait;
use chrono::DateTime;
use tracing::{debug, instrument};
use yahoo_finance_api::{Quote, YahooConnector};

use super::{Bar, MarketDataProvider, Period, PriceSeries};
use crate::error::{Result, StockError};

/// Every indicator works on daily closes
const DAILY_INTERVAL: &str = "1d";

/// [`MarketDataProvider`] backed by the public Yahoo chart API
pub struct YahooFinanceClient {
    connector: YahooConnector,
}

impl YahooFinanceClient {
    pub fn new() -> Result<Self> {
        let connector = YahooConnector::new().map_err(yahoo_error)?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(skip(self), fields(period = %period))]
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let quotes = self
            .connector
            .get_quote_range(symbol, DAILY_INTERVAL, period.as_str())
            .await
            .and_then(|response| response.quotes())
            .map_err(yahoo_error)?;

        // Bars with an out-of-range timestamp are dropped
        let bars: Vec<Bar> = quotes.iter().filter_map(to_bar).collect();
        debug!(symbol, bars = bars.len(), "History received");

        if bars.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no price data found for period {period}"),
            });
        }

        Ok(PriceSeries::new(symbol, bars))
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

fn to_bar(quote: &Quote) -> Option<Bar> {
    let seconds = i64::try_from(quote.timestamp).ok()?;
    Some(Bar {
        timestamp: DateTime::from_timestamp(seconds, 0)?,
        open: quote.open,
        high: quote.high,
        low: quote.low,
        close: quote.close,
        volume: quote.volume,
    })
}

fn yahoo_error(err: yahoo_finance_api::YahooError) -> StockError {
    StockError::YahooFinanceError(err.to_string())
}
