//! Stock indicator chat
//!
//! This crate answers free-text questions about a selected stock. A question
//! is routed by keyword to one of six indicator functions (price, volume,
//! SMA, EMA, RSI, MACD), the indicator is computed from freshly fetched
//! market data, and the result is either turned into a comparison sentence
//! or handed to a text-generation service for an explanation.
//!
//! # Architecture
//!
//! - [`api`]: price series model, the [`MarketDataProvider`] seam and the
//!   Yahoo Finance client
//! - [`indicators`]: indicator math over closing prices
//! - [`engine`]: the six indicator functions with their error contract
//! - [`router`]: ordered keyword routing to a [`FunctionName`]
//! - [`comparison`]: "better than" / "worse than" sentences
//! - [`bot`]: the per-turn orchestrator [`StockChat`] and REPL commands
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticker_llm::providers::{OpenAIClient, OpenAISettings};
//! use ticker_stock::{StockChat, StockConfig, UserTurn, YahooFinanceClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let llm = Arc::new(OpenAIClient::new(OpenAISettings::from_env())?);
//!     let chat = StockChat::new(Arc::new(YahooFinanceClient::new()?), llm, StockConfig::from_env()?)?;
//!
//!     let reply = chat.handle_turn(&UserTurn::new("AAPL", "what is the RSI?")).await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod comparison;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod prompts;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use api::{MarketDataProvider, Period, PriceSeries, YahooFinanceClient};
pub use bot::{Command, StockChat, TurnReply, UserTurn};
pub use config::StockConfig;
pub use engine::{ComputationError, FunctionName, IndicatorEngine, IndicatorResult, IndicatorValue};
pub use error::{Result, StockError};
pub use router::IntentRouter;
