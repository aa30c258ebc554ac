//! Shared utilities for ticker-chat
//!
//! This crate provides common functionality used across the ticker-chat workspace:
//! tracing setup and typed lookups of environment configuration.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_parse, env_var, env_var_any, load_dotenv};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
