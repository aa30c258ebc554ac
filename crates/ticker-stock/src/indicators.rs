//! Indicator math over closing-price slices
//!
//! Every function returns a series aligned with its input: element `i` is the
//! indicator value after observing `values[..=i]`. Positions where the value is
//! not yet defined hold `f64::NAN`.
//!
//! Exponential averages are the recursive, non-bias-adjusted form
//! (`alpha = 2 / (span + 1)`, seeded with the first observation), which is what
//! `ta`'s `ExponentialMovingAverage` computes.

use ta::Next;
use ta::indicators::ExponentialMovingAverage;

use crate::error::{Result, StockError};

/// Trailing arithmetic mean over `window` observations.
///
/// The first `window - 1` positions are NaN.
pub fn sma(values: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window("SMA", window)?;

    let mut out = vec![f64::NAN; values.len().min(window.saturating_sub(1))];
    // Sum each window directly so an all-zero window averages to exactly zero
    out.extend(
        values
            .windows(window)
            .map(|w| w.iter().sum::<f64>() / window as f64),
    );
    Ok(out)
}

/// Exponential moving average with the given span.
///
/// Defined from the first observation onward.
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span)
        .map_err(|e| StockError::IndicatorError(format!("EMA span {span}: {e}")))?;

    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// Relative strength index from rolling-mean gains and losses.
///
/// The first delta has no predecessor and counts as neither gain nor loss.
/// A window with gains and no losses yields 100; a window with no movement at
/// all yields NaN.
pub fn rsi(closes: &[f64], window: usize) -> Result<Vec<f64>> {
    check_window("RSI", window)?;

    let deltas = std::iter::once(0.0).chain(closes.windows(2).map(|w| w[1] - w[0]));
    let (gains, losses): (Vec<f64>, Vec<f64>) = deltas
        .take(closes.len())
        .map(|d| (if d > 0.0 { d } else { 0.0 }, if d < 0.0 { -d } else { 0.0 }))
        .unzip();

    let avg_gain = sma(&gains, window)?;
    let avg_loss = sma(&losses, window)?;

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| {
            let rs = gain / loss;
            100.0 - 100.0 / (1.0 + rs)
        })
        .collect())
}

/// MACD histogram: (EMA(short) - EMA(long)) minus its own EMA over `signal`.
pub fn macd_histogram(closes: &[f64], short: usize, long: usize, signal: usize) -> Result<Vec<f64>> {
    let short_ema = ema(closes, short)?;
    let long_ema = ema(closes, long)?;

    let macd: Vec<f64> = short_ema
        .iter()
        .zip(&long_ema)
        .map(|(s, l)| s - l)
        .collect();
    let signal_line = ema(&macd, signal)?;

    Ok(macd.iter().zip(&signal_line).map(|(m, s)| m - s).collect())
}

/// Last element of an indicator series
pub fn latest(series: &[f64]) -> Option<f64> {
    series.last().copied()
}

fn check_window(indicator: &str, window: usize) -> Result<()> {
    if window == 0 {
        return Err(StockError::IndicatorError(format!(
            "{indicator} window must be greater than 0"
        )));
    }
    Ok(())
}
