//! Interactive terminal chat

use std::io::{self, BufRead, Write};

use comfy_table::{Table, presets::UTF8_FULL};
use ticker_stock::{Command, FunctionName, IntentRouter, StockChat, UserTurn};
use tracing::warn;

/// Table of functions with their descriptions and trigger phrases
pub fn functions_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Function", "Operation", "Description", "Triggered by"]);

    for function in FunctionName::ALL {
        table.add_row(vec![
            function.as_str().to_string(),
            function.operation().to_string(),
            function.description().to_string(),
            IntentRouter::patterns(function).join(", "),
        ]);
    }
    table
}

/// Ask the user to pick one of `tickers` by number
///
/// Re-prompts until a valid choice is made; returns `None` on end of input.
pub fn choose_stock<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    tickers: &[String],
) -> io::Result<Option<String>> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Ticker"]);
    for (i, ticker) in tickers.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), ticker.clone()]);
    }

    writeln!(output, "Select a stock from the following list:")?;
    writeln!(output, "{table}")?;

    loop {
        write!(output, "Enter the number corresponding to your choice: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(None);
        }

        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=tickers.len()).contains(&choice) => {
                return Ok(Some(tickers[choice - 1].clone()));
            }
            _ => writeln!(
                output,
                "Invalid choice. Please select a number within the range."
            )?,
        }
    }
}

/// Question loop for `ticker` until `exit` or end of input
pub async fn run_repl<R: BufRead, W: Write>(
    chat: &StockChat,
    mut ticker: String,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    loop {
        write!(
            output,
            "What would you like to know about {ticker} stock? (Type 'exit' to quit): "
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output, "\nGoodbye!")?;
            return Ok(());
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(output, "Error: {e}")?;
                continue;
            }
        };

        match command {
            Command::Exit => {
                writeln!(output, "Goodbye!")?;
                return Ok(());
            }
            Command::Help => writeln!(output, "{}", Command::help_text())?,
            Command::Functions => writeln!(output, "{}", functions_table())?,
            Command::Switch { ticker: next } => {
                ticker = next;
                writeln!(output, "Switched to {ticker}.")?;
            }
            Command::Analyze { function } => match chat.analyze(function, &ticker).await {
                Ok(text) => writeln!(output, "{text}")?,
                Err(e) => {
                    warn!("Analysis of {} for {} failed: {}", function, ticker, e);
                    writeln!(output, "Error: {e}")?;
                }
            },
            Command::Query { text } => {
                match chat.handle_turn(&UserTurn::new(ticker.as_str(), text)).await {
                    Ok(reply) => writeln!(output, "{reply}")?,
                    Err(e) => {
                        warn!("Turn for {} failed: {}", ticker, e);
                        writeln!(output, "Error: {e}")?;
                    }
                }
            }
        }
    }
}
