//! Intent router mapping free text to an indicator function
//!
//! Each function owns a group of trigger phrases. Groups are checked in a
//! fixed order and the first group with any phrase present in the text wins.
//! Matching is case-insensitive substring matching, so "themacd" still
//! selects MACD.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::engine::FunctionName;
use crate::error::Result;

/// Trigger phrases per function
mod patterns {
    pub const PRICE: &[&str] = &["price", "current price", "stock price", "price of"];

    pub const VOLUME: &[&str] = &[
        "volume",
        "stock volume",
        "trading volume",
        "number of shares traded",
    ];

    pub const SMA: &[&str] = &["SMA", "simple moving average"];

    pub const EMA: &[&str] = &["EMA", "exponential moving average"];

    pub const RSI: &[&str] = &["RSI", "relative strength index"];

    pub const MACD: &[&str] = &["MACD", "moving average convergence divergence"];
}

/// Routing table in priority order
const TABLE: [(FunctionName, &[&str]); 6] = [
    (FunctionName::Price, patterns::PRICE),
    (FunctionName::Volume, patterns::VOLUME),
    (FunctionName::Sma, patterns::SMA),
    (FunctionName::Ema, patterns::EMA),
    (FunctionName::Rsi, patterns::RSI),
    (FunctionName::Macd, patterns::MACD),
];

/// Ordered keyword router
#[derive(Debug, Clone)]
pub struct IntentRouter {
    table: Vec<(FunctionName, Regex)>,
}

impl IntentRouter {
    /// Compile the routing table
    pub fn new() -> Result<Self> {
        let table = TABLE
            .iter()
            .map(|&(function, phrases)| Ok((function, compile(phrases)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { table })
    }

    /// First function whose phrases appear in `text`, if any
    pub fn route(&self, text: &str) -> Option<FunctionName> {
        let routed = self
            .table
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|&(function, _)| function);

        debug!("Routed {:?} to {:?}", text, routed);
        routed
    }

    /// Trigger phrases for `function`
    pub fn patterns(function: FunctionName) -> &'static [&'static str] {
        match function {
            FunctionName::Price => patterns::PRICE,
            FunctionName::Volume => patterns::VOLUME,
            FunctionName::Sma => patterns::SMA,
            FunctionName::Ema => patterns::EMA,
            FunctionName::Rsi => patterns::RSI,
            FunctionName::Macd => patterns::MACD,
        }
    }
}

fn compile(phrases: &[&str]) -> Result<Regex> {
    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");

    Ok(RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()?)
}
