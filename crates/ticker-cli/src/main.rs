//! ticker-chat: ask about a stock's price, volume and technical indicators

mod repl;
mod server;

#[cfg(test)]
mod test_support;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ticker_llm::LLMProvider;
use ticker_llm::providers::{OpenAIClient, OpenAISettings};
use ticker_stock::{FunctionName, Period, StockChat, StockConfig, UserTurn, YahooFinanceClient};
use ticker_utils::LogFormat;
use tracing::{debug, info};

/// Log filter used when RUST_LOG is not set
const LOG_FILTER: &str = "warn,ticker_stock=info,ticker_cli=info";

#[derive(Parser, Debug)]
#[command(name = "ticker-chat", version)]
#[command(about = "Ask about a stock's price, volume and technical indicators", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Chat model used for explanations
    #[arg(long, global = true, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// Seconds to wait for a completion before giving up
    #[arg(long, global = true, env = "OPENAI_TIMEOUT_SECS")]
    llm_timeout: Option<u64>,

    /// Lookback for price, SMA and EMA (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
    #[arg(long, global = true, env = "TICKER_PERIOD")]
    period: Option<Period>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick a stock and ask questions about it interactively
    Chat {
        /// Skip the picker and start with this ticker
        #[arg(short, long)]
        ticker: Option<String>,
    },
    /// Ask a single question
    Ask {
        #[arg(short, long)]
        ticker: String,

        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Run one indicator function and ask for an analysis of its output
    Analyze {
        #[arg(short, long)]
        ticker: String,

        /// price, volume, sma, ema, rsi or macd (operation names also accepted)
        function: FunctionName,
    },
    /// Serve the chat over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
    /// List the indicator functions and their trigger phrases
    Functions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing so that env-backed flags see .env values
    let dotenv_path = ticker_utils::load_dotenv();

    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    ticker_utils::init_tracing_with(format, LOG_FILTER);

    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Some(Commands::Functions) => {
            println!("{}", repl::functions_table());
        }
        Some(Commands::Ask {
            ref ticker,
            ref question,
        }) => {
            let chat = build_chat(&cli)?;
            let reply = chat
                .handle_turn(&UserTurn::new(ticker.as_str(), question.join(" ")))
                .await?;
            println!("{reply}");
        }
        Some(Commands::Analyze {
            ref ticker,
            function,
        }) => {
            let chat = build_chat(&cli)?;
            println!("{}", chat.analyze(function, ticker).await?);
        }
        Some(Commands::Serve { addr }) => {
            let chat = Arc::new(build_chat(&cli)?);
            server::serve(chat, addr).await?;
        }
        Some(Commands::Chat { ref ticker }) => {
            let chat = build_chat(&cli)?;
            run_chat(&chat, ticker.clone()).await?;
        }
        None => {
            let chat = build_chat(&cli)?;
            run_chat(&chat, None).await?;
        }
    }

    Ok(())
}

async fn run_chat(chat: &StockChat, ticker: Option<String>) -> anyhow::Result<()> {
    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    let ticker = match ticker {
        Some(ticker) => ticker.trim().to_uppercase(),
        None => match repl::choose_stock(&mut input, &mut output, &chat.config().known_tickers)? {
            Some(ticker) => ticker,
            None => return Ok(()),
        },
    };

    repl::run_repl(chat, ticker, &mut input, &mut output).await?;
    Ok(())
}

fn build_chat(cli: &Cli) -> anyhow::Result<StockChat> {
    let mut builder = StockConfig::builder().with_env()?;
    if let Some(model) = &cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(period) = cli.period {
        builder = builder.default_period(period);
    }
    let config = builder.build()?;

    info!("Using model {}", config.model);
    let llm = build_llm(cli)?;
    let market_data = Arc::new(YahooFinanceClient::new()?);

    Ok(StockChat::new(market_data, llm, config)?)
}

fn build_llm(cli: &Cli) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let mut settings = OpenAISettings::from_env();
    if let Some(api_base) = &cli.api_base {
        settings = settings.api_base(api_base.as_str());
    }
    if let Some(secs) = cli.llm_timeout {
        settings = settings.timeout(Duration::from_secs(secs));
    }

    info!("Text generation via {}", settings.api_base);
    Ok(Arc::new(OpenAIClient::new(settings)?))
}
