//! Indicator result types

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FunctionName;
use crate::error::StockError;

/// Value produced by one indicator function
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    /// Single number; NaN and infinities are legitimate results
    Scalar(f64),
    /// Traded volume per bar
    Volume(BTreeMap<DateTime<Utc>, u64>),
}

impl IndicatorValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Volume(_) => None,
        }
    }
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => f.write_str(&format_float(*v)),
            Self::Volume(volumes) => {
                f.write_str("{")?;
                for (i, (timestamp, volume)) in volumes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {volume}", timestamp.format("%Y-%m-%d"))?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Failure of one indicator function for one ticker
///
/// Displays as e.g. `Error calculating RSI for AAPL: <cause>`.
#[derive(Debug, thiserror::Error)]
#[error("{} for {ticker}: {source}", .function.failure_prefix())]
pub struct ComputationError {
    pub function: FunctionName,
    pub ticker: String,
    #[source]
    pub source: StockError,
}

impl ComputationError {
    pub fn new(function: FunctionName, ticker: impl Into<String>, source: StockError) -> Self {
        Self {
            function,
            ticker: ticker.into(),
            source,
        }
    }
}

/// Outcome of an indicator function
pub type IndicatorResult = std::result::Result<IndicatorValue, ComputationError>;

/// Render a float the way dynamic languages print them: `150.0`, `0.25`,
/// `1e-05`, `nan`, `inf`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => formatted,
        };
    }

    let formatted = value.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}
