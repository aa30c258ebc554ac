//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "warn,ticker_stock=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Pretty,
    /// Newline-delimited JSON
    Json,
}

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(LogFormat::default(), DEFAULT_FILTER);
}

/// Initialize tracing with an explicit format and fallback filter.
///
/// `RUST_LOG` still wins over `fallback_filter` when it is set.
pub fn init_tracing_with(format: LogFormat, fallback_filter: &str) {
    let filter = build_filter(fallback_filter);
    let registry = tracing_subscriber::registry().with(filter);

    // try_init so tests and embedders that already installed a subscriber don't panic
    let _ = match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
}

fn build_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
