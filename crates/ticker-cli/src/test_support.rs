//! Offline providers for front-end tests

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ticker_llm::{ChatRequest, Completion, LLMError, LLMProvider};
use ticker_stock::api::Bar;
use ticker_stock::{MarketDataProvider, Period, PriceSeries, StockChat, StockConfig, StockError};

/// Market data with the same closes for every symbol, or no data at all
pub struct StaticMarketData {
    closes: Vec<f64>,
}

impl StaticMarketData {
    pub fn new(closes: Vec<f64>) -> Self {
        Self { closes }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn history(&self, symbol: &str, _period: Period) -> ticker_stock::Result<PriceSeries> {
        if self.closes.is_empty() {
            return Err(StockError::YahooFinanceError(format!("no data for {symbol}")));
        }

        let bars = self
            .closes
            .iter()
            .zip(0_i64..)
            .map(|(&close, day)| Bar {
                timestamp: chrono_day(day),
                open: close,
                high: close,
                low: close,
                close,
                volume: 500,
            })
            .collect();
        Ok(PriceSeries::new(symbol, bars))
    }

    fn name(&self) -> &str {
        "static"
    }
}

fn chrono_day(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(day)
}

/// Text generation with a fixed reply, or a fixed failure
pub struct CannedLLM {
    reply: Option<String>,
}

impl CannedLLM {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
        }
    }

    pub fn unavailable() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl LLMProvider for CannedLLM {
    async fn complete(&self, _request: &ChatRequest) -> ticker_llm::Result<Completion> {
        match &self.reply {
            Some(reply) => Ok(Completion::text(reply.as_str())),
            None => Err(LLMError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "canned"
    }
}

pub fn chat_with(market: StaticMarketData, llm: CannedLLM) -> StockChat {
    StockChat::new(Arc::new(market), Arc::new(llm), StockConfig::default()).unwrap()
}
