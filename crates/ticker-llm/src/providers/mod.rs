//! Network-backed [`LLMProvider`](crate::LLMProvider) implementations

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIClient, OpenAISettings};
