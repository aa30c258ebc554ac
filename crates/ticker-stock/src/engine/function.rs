//! The fixed set of indicator functions a question can be routed to

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StockError;

/// Indicator function targeted by a user question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionName {
    Price,
    Volume,
    Sma,
    Ema,
    Rsi,
    Macd,
}

impl FunctionName {
    /// All functions in routing priority order
    pub const ALL: [FunctionName; 6] = [
        Self::Price,
        Self::Volume,
        Self::Sma,
        Self::Ema,
        Self::Rsi,
        Self::Macd,
    ];

    /// Short name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Volume => "volume",
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
        }
    }

    /// Long operation name, e.g. `calculate_rsi`
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Price => "get_stock_price",
            Self::Volume => "get_stock_volume",
            Self::Sma => "calculate_sma",
            Self::Ema => "calculate_ema",
            Self::Rsi => "calculate_rsi",
            Self::Macd => "calculate_macd",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Price => "Get the latest closing price of a stock.",
            Self::Volume => "Get the historical volume data for a stock.",
            Self::Sma => "Calculate the Simple Moving Average (SMA) for a given stock.",
            Self::Ema => "Calculate the Exponential Moving Average (EMA) for a given stock.",
            Self::Rsi => "Calculate the Relative Strength Index (RSI) for a given stock.",
            Self::Macd => {
                "Calculate the Moving Average Convergence Divergence (MACD) for a given stock."
            }
        }
    }

    /// Leading text of the error message when this function fails
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Self::Price => "Error fetching stock price",
            Self::Volume => "Error fetching stock volume",
            Self::Sma => "Error calculating SMA",
            Self::Ema => "Error calculating EMA",
            Self::Rsi => "Error calculating RSI",
            Self::Macd => "Error calculating MACD",
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionName {
    type Err = StockError;

    /// Accepts the short name or the operation name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted || f.operation() == wanted)
            .ok_or_else(|| StockError::UnknownFunction(s.to_string()))
    }
}
