//! Two-stock comparison phrasing
//!
//! Recognises "X better than Y" / "X worse than Y" questions and turns the
//! primary ticker's indicator result into a fixed sentence. No second fetch
//! is made for the other ticker.

use std::fmt;

/// Reply when the primary result is empty
pub const COMPARISON_UNAVAILABLE: &str =
    "Sorry, I couldn't retrieve the information to perform the comparison.";

/// Comparison direction named in the utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    BetterThan,
    WorseThan,
}

impl ComparisonOperator {
    /// Phrase as it appears in text
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BetterThan => "better than",
            Self::WorseThan => "worse than",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `text` uses comparison phrasing
pub fn is_comparison(text: &str) -> bool {
    detect_operator(text).is_some()
}

/// Operator in `text`; "better than" takes precedence
pub fn detect_operator(text: &str) -> Option<ComparisonOperator> {
    let lower = text.to_lowercase();
    [ComparisonOperator::BetterThan, ComparisonOperator::WorseThan]
        .into_iter()
        .find(|op| lower.contains(op.as_str()))
}

/// First known ticker other than `primary` mentioned anywhere in `text`
pub fn find_other_ticker<'a, S: AsRef<str>>(text: &str, primary: &str, known: &'a [S]) -> Option<&'a str> {
    let lower = text.to_lowercase();
    known
        .iter()
        .map(|ticker| ticker.as_ref())
        .filter(|ticker| !ticker.eq_ignore_ascii_case(primary.trim()))
        .find(|ticker| lower.contains(&ticker.to_lowercase()))
}

/// Compose the comparison sentence for `primary`'s `result`
///
/// Returns `None` when no second ticker or no operator can be found.
pub fn compare_stocks<S: AsRef<str>>(
    utterance: &str,
    primary: &str,
    result: &str,
    known: &[S],
) -> Option<String> {
    let other = find_other_ticker(utterance, primary, known)?;
    let operator = detect_operator(utterance)?;

    if result.is_empty() {
        return Some(COMPARISON_UNAVAILABLE.to_string());
    }
    Some(format!(
        "The {primary} stock {result} is {operator} the {other} stock."
    ))
}
