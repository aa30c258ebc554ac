//! Command parsing for the interactive chat
//!
//! Anything that is not a slash command (or the bare word `exit`) is a
//! question about the selected stock.

use crate::engine::FunctionName;
use crate::error::{Result, StockError};

/// Parsed line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Question about the selected stock
    Query { text: String },
    /// Change the selected stock
    Switch { ticker: String },
    /// Run one function directly and ask for an open analysis
    Analyze { function: FunctionName },
    /// List the indicator functions
    Functions,
    /// Show help
    Help,
    /// Leave the chat
    Exit,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(StockError::EmptyInput);
        }

        if input.eq_ignore_ascii_case("exit") {
            return Ok(Command::Exit);
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Query {
                text: input.to_string(),
            });
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(StockError::CommandError("Empty command".to_string()));
        };

        match cmd.to_lowercase().as_str() {
            "switch" | "s" | "ticker" => {
                let ticker = args.first().ok_or_else(|| {
                    StockError::CommandError("Missing ticker for switch command".to_string())
                })?;
                Ok(Command::Switch {
                    ticker: ticker.to_uppercase(),
                })
            }
            "analyze" | "a" => {
                let name = args.first().ok_or_else(|| {
                    StockError::CommandError("Missing function for analyze command".to_string())
                })?;
                Ok(Command::Analyze {
                    function: name.parse()?,
                })
            }
            "functions" | "f" => Ok(Command::Functions),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            other => Err(StockError::CommandError(format!("Unknown command: {other}"))),
        }
    }

    /// Help text for all commands
    pub fn help_text() -> &'static str {
        r"
Ask a question about the selected stock, for example:
  what's the current price?
  what is the RSI?
  is the SMA better than MSFT?

Commands:
  /switch <ticker>       Select another stock
  /analyze <function>    Analyze one function directly (price, volume, sma, ema, rsi, macd)
  /functions             List the indicator functions
  /help                  Show this help
  exit                   Leave the chat

Aliases:
  /s = /switch   /a = /analyze   /f = /functions   /q = exit
"
    }
}
