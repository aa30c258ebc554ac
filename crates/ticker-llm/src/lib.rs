//! Text generation for ticker-chat
//!
//! Chat request and reply types, the [`LLMProvider`] seam, and (behind the
//! default `openai` feature) a client for any OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod chat;
pub mod error;
pub mod provider;

#[cfg(feature = "openai")]
pub mod providers;

pub use chat::{ChatMessage, ChatRequest, Completion, FinishReason, Role, Sampling, Usage};
pub use error::{LLMError, Result};
pub use provider::LLMProvider;
