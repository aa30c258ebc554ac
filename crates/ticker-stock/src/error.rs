//! Error types for stock operations

use thiserror::Error;

/// Stock chat specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Empty or missing ticker symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Lookback period the data provider does not understand
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Unknown indicator function name
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Prompt template error
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Router pattern failed to compile
    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    /// Malformed chat command
    #[error("Command error: {0}")]
    CommandError(String),

    /// The user sent an empty or whitespace-only message
    #[error("Please provide a valid input.")]
    EmptyInput,

    /// Text generation failed
    #[error("LLM error: {0}")]
    Llm(#[from] ticker_llm::LLMError),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<ticker_utils::ConfigError> for StockError {
    fn from(err: ticker_utils::ConfigError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

impl StockError {
    /// Whether the error was caused by the caller's input rather than a backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::CommandError(_)
                | Self::InvalidSymbol(_)
                | Self::InvalidPeriod(_)
                | Self::UnknownFunction(_)
        )
    }
}
