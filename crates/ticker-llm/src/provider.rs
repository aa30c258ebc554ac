//! Text-generation seam

use async_trait::async_trait;

use crate::{ChatRequest, Completion, Result};

/// Service that turns a chat request into one reply
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion>;

    /// Short name for logs, e.g. "openai"
    fn name(&self) -> &str;
}
