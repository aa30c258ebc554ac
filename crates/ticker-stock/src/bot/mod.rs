//! Per-turn dialogue orchestration
//!
//! [`StockChat`] ties the router, the indicator engine, the comparison
//! resolver and the text-generation service together. It holds no
//! conversation state: the selected ticker arrives with every turn, so one
//! instance can serve any number of callers.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticker_stock::{StockChat, UserTurn};
//!
//! let chat = StockChat::new(market_data, llm, config)?;
//! let reply = chat.handle_turn(&UserTurn::new("AAPL", "what is the RSI?")).await?;
//! println!("{reply}");
//! ```

pub mod commands;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ticker_llm::{ChatRequest, LLMProvider};
use tracing::{debug, info, instrument};

use crate::api::MarketDataProvider;
use crate::comparison;
use crate::config::StockConfig;
use crate::engine::{FunctionName, IndicatorEngine, IndicatorResult};
use crate::error::{Result, StockError};
use crate::prompts::{self, Prompts};
use crate::router::IntentRouter;

pub use commands::Command;

/// One user message with the ticker it is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTurn {
    pub ticker: String,
    pub utterance: String,
}

impl UserTurn {
    pub fn new(ticker: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            utterance: utterance.into(),
        }
    }
}

/// Outcome of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReply {
    /// No indicator function matched the utterance
    NoMatch(String),
    /// Templated two-stock comparison sentence
    Comparison(String),
    /// Comparison phrasing without a second known ticker
    ComparisonIncomplete(String),
    /// Text from the text-generation service
    Explanation(String),
}

impl TurnReply {
    /// Reply text shown to the user
    pub fn text(&self) -> &str {
        match self {
            Self::NoMatch(text)
            | Self::Comparison(text)
            | Self::ComparisonIncomplete(text)
            | Self::Explanation(text) => text,
        }
    }

    /// Whether the text came from the text-generation service
    pub fn is_explanation(&self) -> bool {
        matches!(self, Self::Explanation(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::NoMatch(text)
            | Self::Comparison(text)
            | Self::ComparisonIncomplete(text)
            | Self::Explanation(text) => text,
        }
    }
}

impl fmt::Display for TurnReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Stock chat orchestrator
pub struct StockChat {
    engine: IndicatorEngine,
    router: IntentRouter,
    prompts: Prompts,
    llm: Arc<dyn LLMProvider>,
    config: Arc<StockConfig>,
}

impl StockChat {
    /// Create a chat over the given market data and text-generation providers
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        llm: Arc<dyn LLMProvider>,
        config: StockConfig,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        Ok(Self {
            engine: IndicatorEngine::new(market_data, config.clone()),
            router: IntentRouter::new()?,
            prompts: Prompts::new()?,
            llm,
            config,
        })
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// Answer one user turn
    ///
    /// Empty utterances and blank tickers are rejected before anything is
    /// routed or fetched. Indicator failures become part of the reply text;
    /// only text-generation failures come back as errors.
    #[instrument(skip(self, turn), fields(ticker = %turn.ticker))]
    pub async fn handle_turn(&self, turn: &UserTurn) -> Result<TurnReply> {
        let utterance = turn.utterance.as_str();
        if utterance.trim().is_empty() {
            return Err(StockError::EmptyInput);
        }

        let ticker = normalize_ticker(&turn.ticker)?;

        let Some(function) = self.router.route(utterance) else {
            info!("No function matched {:?}", utterance);
            return Ok(TurnReply::NoMatch(prompts::NO_MATCHING_FUNCTION.to_string()));
        };

        let result = render(self.engine.run(function, &ticker).await);

        if comparison::is_comparison(utterance) {
            let known = &self.config.known_tickers;
            return Ok(
                match comparison::compare_stocks(utterance, &ticker, &result, known) {
                    Some(sentence) => TurnReply::Comparison(sentence),
                    None => TurnReply::ComparisonIncomplete(prompts::comparison_incomplete(known)),
                },
            );
        }

        let annotation = match function {
            FunctionName::Sma => prompts::SMA_CONTEXT,
            _ => "",
        };

        let request = self
            .request()
            .system(self.prompts.system(&ticker)?)
            .user(self.prompts.explain(&result, annotation)?);

        let text = self.complete(&request).await?;
        Ok(TurnReply::Explanation(text))
    }

    /// Run one function directly and ask for an open analysis of its output
    #[instrument(skip(self))]
    pub async fn analyze(&self, function: FunctionName, ticker: &str) -> Result<String> {
        let ticker = normalize_ticker(ticker)?;
        let output = render(self.engine.run(function, &ticker).await);

        let request = self.request().user(self.prompts.analysis(&output)?);
        self.complete(&request).await
    }

    fn request(&self) -> ChatRequest {
        ChatRequest::new(&self.config.model, self.config.sampling())
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        debug!("Sending completion request to {}", self.llm.name());
        let completion = self.llm.complete(request).await?;
        Ok(completion.text)
    }
}

fn normalize_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(StockError::InvalidSymbol(ticker.to_string()));
    }
    Ok(ticker.to_uppercase())
}

/// Text of a result, with failures reduced to their message
fn render(result: IndicatorResult) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeMarketData, RecordingLLM};
    use ticker_llm::{LLMError, Role, Sampling};

    fn chat(market: FakeMarketData, llm: RecordingLLM) -> (StockChat, Arc<FakeMarketData>, Arc<RecordingLLM>) {
        let market = Arc::new(market);
        let llm = Arc::new(llm);
        let chat = StockChat::new(market.clone(), llm.clone(), StockConfig::default()).unwrap();
        (chat, market, llm)
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_before_any_work() {
        let (chat, market, llm) = chat(
            FakeMarketData::with_closes(vec![1.0]),
            RecordingLLM::replying("unused"),
        );

        for utterance in ["", "   ", "\n\t"] {
            let err = chat.handle_turn(&UserTurn::new("AAPL", utterance)).await.unwrap_err();
            assert!(matches!(err, StockError::EmptyInput));
        }
        assert_eq!(market.calls(), 0);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_ticker_is_rejected() {
        let (chat, market, _) = chat(
            FakeMarketData::with_closes(vec![1.0]),
            RecordingLLM::replying("unused"),
        );

        let err = chat.handle_turn(&UserTurn::new(" ", "price?")).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(market.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_match_skips_engine_and_llm() {
        let (chat, market, llm) = chat(
            FakeMarketData::with_closes(vec![1.0]),
            RecordingLLM::replying("unused"),
        );

        let reply = chat
            .handle_turn(&UserTurn::new("AAPL", "tell me a joke"))
            .await
            .unwrap();

        assert_eq!(
            reply,
            TurnReply::NoMatch("Error: No matching function found for the given prompt.".to_string())
        );
        assert_eq!(market.calls(), 0);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_explanation_request() {
        let (chat, _, llm) = chat(
            FakeMarketData::with_closes(vec![148.0, 150.0]),
            RecordingLLM::replying("AAPL closed at 150."),
        );

        let reply = chat
            .handle_turn(&UserTurn::new("aapl", "what's the current price?"))
            .await
            .unwrap();
        assert_eq!(reply, TurnReply::Explanation("AAPL closed at 150.".to_string()));

        let request = llm.last_request().unwrap();
        assert_eq!(request.model, "gpt-3.5-turbo-0125");
        assert_eq!(request.sampling, Sampling::default());
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are asking about AAPL stock.");
        assert_eq!(request.last_user_text(), Some("Explain this result: 150.0 "));
    }

    #[tokio::test]
    async fn test_failure_text_is_forwarded_verbatim() {
        let (chat, _, llm) = chat(
            FakeMarketData::failing("connection refused"),
            RecordingLLM::replying("Sorry, no data."),
        );

        let reply = chat
            .handle_turn(&UserTurn::new("AAPL", "what's the current price?"))
            .await
            .unwrap();
        assert!(reply.is_explanation());

        let request = llm.last_request().unwrap();
        assert_eq!(
            request.last_user_text().unwrap(),
            "Explain this result: Error fetching stock price for AAPL: Yahoo Finance error: connection refused "
        );
    }

    #[tokio::test]
    async fn test_sma_annotation() {
        let closes: Vec<f64> = (1..=60).map(f64::from).collect();
        let (chat, _, llm) = chat(FakeMarketData::with_closes(closes), RecordingLLM::replying("ok"));

        chat.handle_turn(&UserTurn::new("MSFT", "what is the simple moving average?"))
            .await
            .unwrap();

        let request = llm.last_request().unwrap();
        // mean of 11..=60
        assert_eq!(
            request.last_user_text().unwrap(),
            format!("Explain this result: 35.5 {}", prompts::SMA_CONTEXT)
        );
    }

    #[tokio::test]
    async fn test_sma_annotation_follows_routed_function() {
        let (chat, _, llm) = chat(FakeMarketData::with_closes(vec![1.0, 2.0]), RecordingLLM::replying("ok"));

        // "price" routes first, so the SMA note is not attached
        chat.handle_turn(&UserTurn::new("AAPL", "price vs sma?")).await.unwrap();

        let request = llm.last_request().unwrap();
        assert_eq!(request.last_user_text(), Some("Explain this result: 2.0 "));
    }

    #[tokio::test]
    async fn test_comparison_bypasses_llm() {
        let (chat, _, llm) = chat(
            FakeMarketData::with_closes(vec![150.0]),
            RecordingLLM::replying("unused"),
        );

        let reply = chat
            .handle_turn(&UserTurn::new("AAPL", "Is the price of AAPL better than MSFT?"))
            .await
            .unwrap();

        assert_eq!(
            reply,
            TurnReply::Comparison("The AAPL stock 150.0 is better than the MSFT stock.".to_string())
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_comparison_without_second_ticker() {
        let (chat, _, llm) = chat(
            FakeMarketData::with_closes(vec![150.0]),
            RecordingLLM::replying("unused"),
        );

        let reply = chat
            .handle_turn(&UserTurn::new("AAPL", "is the price better than yesterday?"))
            .await
            .unwrap();

        assert!(matches!(reply, TurnReply::ComparisonIncomplete(_)));
        assert!(reply.text().contains("AAPL, MSFT, GOOGL, TSLA, AMZN"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let (chat, _, _) = chat(
            FakeMarketData::with_closes(vec![150.0]),
            RecordingLLM::failing(LLMError::RateLimited("slow down".to_string())),
        );

        let err = chat
            .handle_turn(&UserTurn::new("AAPL", "price?"))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Llm(LLMError::RateLimited(_))));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_analyze_sends_single_user_message() {
        let (chat, _, llm) = chat(
            FakeMarketData::with_closes(vec![10.0, 12.5]),
            RecordingLLM::replying("Looks steady."),
        );

        let text = chat.analyze(FunctionName::Price, "tsla").await.unwrap();
        assert_eq!(text, "Looks steady.");

        let request = llm.last_request().unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(
            request.messages[0].content,
            "Based on the following stock data: 12.5, provide an analysis and insights."
        );
    }
}
