/// LLM Client: The single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the inference API directly.
/// Engines go through `complete`; the chat relay goes through `open_stream`.
///
/// There is no retry here. Every failure is surfaced immediately and the
/// caller decides whether to abort or degrade.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::text::truncate_chars;

pub mod prompts;
pub mod stream;

/// Used whenever a caller passes a blank model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Synchronous generations can take minutes on long transcripts.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(480);
const STREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("inference API key is not configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API reported an error: {message} ({kind})")]
    Upstream { message: String, kind: String },

    #[error("inference response had no choices")]
    EmptyResult,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Maps a caller-supplied role onto the three roles the API accepts.
    /// Anything unrecognised is treated as the user speaking.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" => Role::System,
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Connection settings for the inference service.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Shared client for the OpenAI-compatible chat completions API.
/// Cheap to clone; both inner `reqwest::Client`s share their connection pools.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    stream_client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            client: Client::builder()
                .timeout(COMPLETION_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            // Streaming bodies are open-ended, so only the connect phase is bounded.
            stream_client: Client::builder()
                .connect_timeout(STREAM_CONNECT_TIMEOUT)
                .build()
                .expect("Failed to build streaming HTTP client"),
            api_key: settings.api_key,
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            model: settings.model,
        }
    }

    /// The configured default model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs a non-streaming completion with the configured model.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        json_mode: bool,
    ) -> Result<String, LlmError> {
        self.complete_with_model(&self.model, messages, json_mode).await
    }

    /// Sends the whole conversation and returns the first choice's text.
    /// With `json_mode` the API is asked to reply with a single JSON object.
    pub async fn complete_with_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
        json_mode: bool,
    ) -> Result<String, LlmError> {
        let model = resolve_model(model);
        let request_body = ChatRequest {
            model,
            messages,
            stream: false,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        info!(
            "Sending completion request: model={model}, messages={}",
            messages.len()
        );

        let response = self
            .authorized_post(&self.client)?
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to decode completion response: {e}. Body (truncated): {}",
                truncate_chars(&body, ERROR_BODY_LIMIT, "...(truncated)")
            );
            LlmError::Parse(e)
        })?;

        if let Some(err) = parsed.error.filter(|e| !e.message.is_empty()) {
            return Err(LlmError::Upstream {
                message: err.message,
                kind: err.kind,
            });
        }

        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResult)?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Completion response (first 200 chars): {}",
            truncate_chars(&content, 200, "...(truncated)")
        );

        Ok(content)
    }

    /// Opens a streaming completion and returns the live response once the
    /// upstream has accepted it. Reading the body is the relay's job.
    pub async fn open_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, LlmError> {
        let model = resolve_model(model);
        let request_body = ChatRequest {
            model,
            messages,
            stream: true,
            response_format: None,
        };

        info!(
            "Opening completion stream: model={model}, messages={}",
            messages.len()
        );

        let response = self
            .authorized_post(&self.stream_client)?
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(response)
    }

    fn authorized_post(&self, client: &Client) -> Result<reqwest::RequestBuilder, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }
        Ok(client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json"))
    }
}

fn resolve_model(model: &str) -> &str {
    let model = model.trim();
    if model.is_empty() {
        DEFAULT_MODEL
    } else {
        model
    }
}

/// Builds an `Api` error, preferring the structured `error.message` field.
fn api_error(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| truncate_chars(body, ERROR_BODY_LIMIT, ""));
    LlmError::Api { status, message }
}

/// Decodes a model reply as JSON, tolerating Markdown code fences around it.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_json_fences(text))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
