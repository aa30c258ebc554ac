//! Chat request and completion types
//!
//! Only plain text is modelled. Every request this workspace sends is an
//! optional system line followed by one user line, and every reply is a single
//! block of text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

/// One `{role, content}` entry; serializes in the chat-completions wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Generation limits sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Generation ends at the first of these; empty means no stop sequences
    pub stop: Vec<String>,
}

impl Default for Sampling {
    /// Short single-line answers: 150 tokens, temperature 0.7, stop at a
    /// newline or a new speaker label
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.7,
            stop: vec!["\n".to_string(), "User:".to_string(), "System:".to_string()],
        }
    }
}

/// A chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub sampling: Sampling,
}

impl ChatRequest {
    /// Request with no messages yet
    pub fn new(model: impl Into<String>, sampling: Sampling) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            sampling,
        }
    }

    /// Append a system message
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::new(Role::System, content));
        self
    }

    /// Append a user message
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::new(Role::User, content));
        self
    }

    /// Content of the last user message, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end or a stop sequence
    Stop,
    /// Ran into `max_tokens`
    Length,
    /// Reply withheld by the service's content filter
    ContentFilter,
    /// Missing or unrecognised reason
    Unknown,
}

impl FinishReason {
    /// Map the wire `finish_reason` field
    pub fn from_wire(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => Self::Stop,
            Some("length") => Self::Length,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::Unknown,
        }
    }
}

/// Token accounting reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Generated reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub finish: FinishReason,
    /// Absent when the service does not report usage
    pub usage: Option<Usage>,
}

impl Completion {
    /// Reply that ended naturally with no usage report
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish: FinishReason::Stop,
            usage: None,
        }
    }
}
