//! Prompt templates for explanation requests
//!
//! Templates are compiled once into a `minijinja` environment and rendered
//! per turn. The fixed reply strings shown to the user without a model call
//! live here too.

use minijinja::{Environment, context};

use crate::error::Result;

/// Reply when no function matches the utterance
pub const NO_MATCHING_FUNCTION: &str = "Error: No matching function found for the given prompt.";

/// Annotation appended to SMA explanations
pub const SMA_CONTEXT: &str = "(Simple Moving Average is a commonly used indicator to analyze stock trends. A higher SMA value may indicate a bullish trend, while a lower value may suggest a bearish trend.)";

const SYSTEM: &str = "system";
const EXPLAIN: &str = "explain";
const ANALYSIS: &str = "analysis";

const SYSTEM_TEMPLATE: &str = "You are asking about {{ ticker }} stock.";
const EXPLAIN_TEMPLATE: &str = "Explain this result: {{ result }} {{ context }}";
const ANALYSIS_TEMPLATE: &str =
    "Based on the following stock data: {{ output }}, provide an analysis and insights.";

/// Reply when a comparison question names no second known ticker or no operator
pub fn comparison_incomplete<S: AsRef<str>>(known: &[S]) -> String {
    let tickers = known.iter().map(|t| t.as_ref()).collect::<Vec<&str>>().join(", ");
    format!(
        "Sorry, I couldn't find a second known stock ({tickers}) or a comparison to make in your question."
    )
}

/// Compiled prompt templates
#[derive(Debug)]
pub struct Prompts {
    env: Environment<'static>,
}

impl Prompts {
    /// Compile all templates
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(SYSTEM, SYSTEM_TEMPLATE)?;
        env.add_template(EXPLAIN, EXPLAIN_TEMPLATE)?;
        env.add_template(ANALYSIS, ANALYSIS_TEMPLATE)?;
        Ok(Self { env })
    }

    /// System message naming the selected ticker
    pub fn system(&self, ticker: &str) -> Result<String> {
        Ok(self.env.get_template(SYSTEM)?.render(context! { ticker })?)
    }

    /// User message asking for an explanation of `result`
    ///
    /// `annotation` may be empty; the separating space is kept either way.
    pub fn explain(&self, result: &str, annotation: &str) -> Result<String> {
        Ok(self
            .env
            .get_template(EXPLAIN)?
            .render(context! { result, context => annotation })?)
    }

    /// User message asking for an open analysis of one function's output
    pub fn analysis(&self, output: &str) -> Result<String> {
        Ok(self.env.get_template(ANALYSIS)?.render(context! { output })?)
    }
}
