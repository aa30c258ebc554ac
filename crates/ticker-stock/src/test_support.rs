//! In-memory providers for tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use ticker_llm::{ChatRequest, Completion, LLMError, LLMProvider};

use crate::api::{Bar, MarketDataProvider, Period, PriceSeries};
use crate::error::{Result, StockError};

/// Daily bars from 2024-01-02 onward with the given closes
pub fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .zip(0_i64..)
        .map(|(&close, day)| Bar {
            timestamp: start + Duration::days(day),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000 + day as u64,
        })
        .collect();
    PriceSeries::new(symbol, bars)
}

/// Market data returning fixed closes, or a fixed failure
pub struct FakeMarketData {
    closes: Option<Vec<f64>>,
    failure: String,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, Period)>>,
}

impl FakeMarketData {
    pub fn with_closes(closes: Vec<f64>) -> Self {
        Self {
            closes: Some(closes),
            failure: String::new(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            closes: None,
            failure: message.to_string(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, Period)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarketData {
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((symbol.to_string(), period));

        match &self.closes {
            Some(closes) => Ok(series_from_closes(symbol, closes)),
            None => Err(StockError::YahooFinanceError(self.failure.clone())),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Text generation that records requests and returns a canned reply
pub struct RecordingLLM {
    reply: String,
    failure: Mutex<Option<LLMError>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RecordingLLM {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails the first call with `error`, then replies with an empty string
    pub fn failing(error: LLMError) -> Self {
        Self {
            reply: String::new(),
            failure: Mutex::new(Some(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LLMProvider for RecordingLLM {
    async fn complete(&self, request: &ChatRequest) -> ticker_llm::Result<Completion> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }

        Ok(Completion::text(self.reply.clone()))
    }

    fn name(&self) -> &str {
        "recording"
    }
}
