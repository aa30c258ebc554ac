//! Client for OpenAI-compatible `/chat/completions` endpoints
//!
//! Works against api.openai.com and against local servers that speak the same
//! protocol (llama.cpp, vLLM, LM Studio). Local servers usually need no key, so
//! the key is only mandatory when talking to the hosted API.
//!
//! ```no_run
//! use ticker_llm::{ChatRequest, LLMProvider, Sampling};
//! use ticker_llm::providers::{OpenAIClient, OpenAISettings};
//!
//! # async fn run() -> ticker_llm::Result<()> {
//! let client = OpenAIClient::new(OpenAISettings::default().api_base("http://localhost:1234/v1"))?;
//! let request = ChatRequest::new("gpt-3.5-turbo-0125", Sampling::default())
//!     .system("You are asking about AAPL stock.")
//!     .user("Explain this result: 189.84 ");
//! println!("{}", client.complete(&request).await?.text);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{ChatMessage, ChatRequest, Completion, FinishReason, LLMError, LLMProvider, Result, Usage};

/// Hosted API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Where and how to reach the endpoint
#[derive(Debug, Clone)]
pub struct OpenAISettings {
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    /// Base URL without trailing slash; `/chat/completions` is appended
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: OPENAI_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAISettings {
    /// Read `OPENAI_API_KEY` (or `API_KEY`) and `OPENAI_API_BASE`
    pub fn from_env() -> Self {
        let settings = Self {
            api_key: ticker_utils::env_var_any(&["OPENAI_API_KEY", "API_KEY"]),
            ..Self::default()
        };

        match ticker_utils::env_var("OPENAI_API_BASE") {
            Some(base) => settings.api_base(base),
            None => settings,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether requests go to the hosted API rather than a compatible server
    pub fn is_hosted(&self) -> bool {
        self.api_base == OPENAI_API_BASE
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

/// [`LLMProvider`] over an OpenAI-compatible HTTP endpoint
pub struct OpenAIClient {
    http: Client,
    settings: OpenAISettings,
}

impl OpenAIClient {
    /// Fails with [`LLMError::MissingApiKey`] when targeting the hosted API
    /// without a key
    pub fn new(settings: OpenAISettings) -> Result<Self> {
        if settings.api_key.is_none() {
            if settings.is_hosted() {
                return Err(LLMError::MissingApiKey);
            }
            warn!("No API key set; calling {} unauthenticated", settings.api_base);
        }

        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &OpenAISettings {
        &self.settings
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        let body = WireRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.sampling.max_tokens,
            temperature: request.sampling.temperature,
            stop: &request.sampling.stop,
        };

        let mut call = self.http.post(self.settings.endpoint()).json(&body);
        if let Some(key) = &self.settings.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LLMError::from_status(status.as_u16(), text, &request.model));
        }

        let reply: WireReply =
            serde_json::from_str(&text).map_err(|e| LLMError::MalformedReply(e.to_string()))?;

        // n defaults to 1; extra choices are ignored
        let choice = reply.choices.into_iter().next().ok_or(LLMError::EmptyReply)?;
        let finish = FinishReason::from_wire(choice.finish_reason.as_deref());
        debug!(?finish, usage = ?reply.usage, "Completion received");

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            finish,
            usage: reply.usage,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireContent,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireContent {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, Sampling};
    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Seen {
        body: Option<Value>,
        authorization: Option<String>,
    }

    type Shared = Arc<Mutex<Seen>>;

    /// Serve `reply` with `status` on `/v1/chat/completions`, recording what arrives
    async fn fake_endpoint(status: StatusCode, reply: Value) -> (String, Shared) {
        let seen = Shared::default();

        let handler = move |State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>| {
            let reply = reply.clone();
            async move {
                let mut seen = seen.lock().unwrap();
                seen.body = Some(body);
                seen.authorization = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                (status, Json(reply))
            }
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(handler))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{addr}/v1/"), seen)
    }

    fn client(api_base: &str, key: Option<&str>) -> OpenAIClient {
        let mut settings = OpenAISettings::default().api_base(api_base);
        settings.api_key = key.map(str::to_string);
        OpenAIClient::new(settings).unwrap()
    }

    fn rsi_question() -> ChatRequest {
        ChatRequest::new("gpt-3.5-turbo-0125", Sampling::default())
            .system("You are asking about MSFT stock.")
            .user("Explain this result: 61.2 ")
    }

    #[test]
    fn test_hosted_api_requires_key() {
        assert!(matches!(OpenAIClient::new(OpenAISettings::default()), Err(LLMError::MissingApiKey)));
        assert!(OpenAIClient::new(OpenAISettings::default().api_key("sk-test")).is_ok());
    }

    #[test]
    fn test_local_server_without_key() {
        let settings = OpenAISettings::default()
            .api_base("http://localhost:1234/v1/")
            .timeout(Duration::from_secs(5));
        let client = OpenAIClient::new(settings).unwrap();
        assert_eq!(client.settings().api_base, "http://localhost:1234/v1");
        assert_eq!(client.settings().timeout, Duration::from_secs(5));
        assert!(!client.settings().is_hosted());
        assert_eq!(client.name(), "openai");
    }

    #[test]
    fn test_settings_from_env() {
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
            std::env::set_var("API_KEY", "legacy-key");
            std::env::set_var("OPENAI_API_BASE", "http://10.0.0.5:8080/v1/");
        }

        let settings = OpenAISettings::from_env();
        assert_eq!(settings.api_key.as_deref(), Some("legacy-key"));
        assert_eq!(settings.api_base, "http://10.0.0.5:8080/v1");

        unsafe {
            std::env::remove_var("API_KEY");
            std::env::remove_var("OPENAI_API_BASE");
        }
    }

    #[tokio::test]
    async fn test_complete_sends_wire_body() {
        let (base, seen) = fake_endpoint(
            StatusCode::OK,
            json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "An RSI of 61 is neutral to bullish."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 22, "completion_tokens": 9}
            }),
        )
        .await;

        let completion = client(&base, Some("sk-test")).complete(&rsi_question()).await.unwrap();

        assert_eq!(completion.text, "An RSI of 61 is neutral to bullish.");
        assert_eq!(completion.finish, FinishReason::Stop);
        assert_eq!(completion.usage.map(|u| u.total()), Some(31));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.authorization.as_deref(), Some("Bearer sk-test"));
        let body = seen.body.clone().unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo-0125");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "You are asking about MSFT stock."}));
        assert_eq!(body["messages"][1]["role"], Role::User.to_string());
        assert_eq!(body["stop"], json!(["\n", "User:", "System:"]));
    }

    #[tokio::test]
    async fn test_empty_stop_and_missing_key_are_omitted() {
        let (base, seen) = fake_endpoint(
            StatusCode::OK,
            json!({"choices": [{"message": {"content": null}, "finish_reason": "length"}]}),
        )
        .await;

        let mut request = rsi_question();
        request.sampling.stop.clear();
        let completion = client(&base, None).complete(&request).await.unwrap();

        assert_eq!(completion.text, "");
        assert_eq!(completion.finish, FinishReason::Length);
        assert_eq!(completion.usage, None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.authorization, None);
        assert!(seen.body.as_ref().unwrap().get("stop").is_none());
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (base, _) = fake_endpoint(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"})).await;
        let err = client(&base, Some("k")).complete(&rsi_question()).await.unwrap_err();
        assert!(matches!(err, LLMError::RateLimited(body) if body.contains("slow down")));

        let (base, _) = fake_endpoint(StatusCode::NOT_FOUND, json!({})).await;
        let err = client(&base, Some("k")).complete(&rsi_question()).await.unwrap_err();
        assert!(matches!(err, LLMError::UnknownModel(model) if model == "gpt-3.5-turbo-0125"));
    }

    #[tokio::test]
    async fn test_reply_without_choices() {
        let (base, _) = fake_endpoint(StatusCode::OK, json!({"choices": []})).await;
        let err = client(&base, Some("k")).complete(&rsi_question()).await.unwrap_err();
        assert!(matches!(err, LLMError::EmptyReply));

        let (base, _) = fake_endpoint(StatusCode::OK, json!({"choices": "nope"})).await;
        let err = client(&base, Some("k")).complete(&rsi_question()).await.unwrap_err();
        assert!(matches!(err, LLMError::MalformedReply(_)));
    }
}
