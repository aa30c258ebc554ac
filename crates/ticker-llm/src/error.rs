//! Text-generation errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

/// Failure of a chat-completion call
#[derive(Error, Debug)]
pub enum LLMError {
    /// No API key was configured
    #[error("no API key configured (set OPENAI_API_KEY or API_KEY)")]
    MissingApiKey,

    /// 401 from the service
    #[error("API key rejected")]
    Unauthorized,

    /// 429 from the service
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// 400 from the service
    #[error("request rejected: {0}")]
    BadRequest(String),

    /// 404 from the service
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Any other non-success status
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, timeout or body transfer failure
    #[cfg(feature = "openai")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status with a body that is not a completion
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The service answered without any choices
    #[error("reply contained no choices")]
    EmptyReply,
}

impl LLMError {
    /// Error for a non-success HTTP status
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            429 => Self::RateLimited(body),
            400 => Self::BadRequest(body),
            404 => Self::UnknownModel(model.to_string()),
            _ => Self::Status { status, body },
        }
    }
}
