//! Language model abstraction used by the clustering engine
//!
//! Supports:
//! - Ollama (local models, `/api/chat` with a `format` schema)
//! - OpenAI-compatible APIs (OpenAI, Groq, Gemini's OpenAI endpoint)
//!
//! # Examples
//!
//! ```no_run
//! use naqla::config::{ModelConfig, ModelProvider as ProviderType};
//! use naqla::llm::{create_provider, ChatMessage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ModelConfig {
//!     provider: ProviderType::Gemini,
//!     url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
//!     model: "gemini-2.0-flash".to_string(),
//!     api_key: Some("GEMINI_API_KEY".to_string()),
//!     ..Default::default()
//! };
//!
//! let provider = create_provider(config)?;
//! let response = provider
//!     .complete(&[ChatMessage::user("مرحبا")], None)
//!     .await?;
//! println!("{:?}", response.content);
//! # Ok(())
//! # }
//! ```

use crate::config::{ModelConfig, ModelProvider as ProviderType};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Model error (HTTP {status}): {message}")]
    ModelError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ProviderError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout | Self::InvalidResponse(_) => true,
            Self::ModelError { status, .. } => *status == 429 || *status >= 500,
            Self::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_decode(),
            Self::JsonError(_) => true,
            Self::AuthError(_) => false,
        }
    }

    fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::ConnectionError(e.to_string())
        }
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message
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

/// Strict JSON-schema response format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

impl ResponseFormat {
    pub fn json_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            strict: true,
            schema,
        }
    }
}

/// Message content as returned by a provider: either a JSON string or an
/// already-parsed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Json(serde_json::Value),
}

impl MessageContent {
    /// Decode the content into `T`.
    ///
    /// Text content may be wrapped in a markdown code fence, which local models
    /// tend to add even when a schema is requested.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Self::Text(text) => serde_json::from_str(strip_code_fence(text)),
            Self::Json(value) => T::deserialize(value),
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Response from a language model
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: MessageContent,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Capability the clustering engine consumes
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a conversation, optionally constrained to a strict JSON schema
    async fn complete(
        &self,
        messages: &[ChatMessage],
        response_format: Option<&ResponseFormat>,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create a language model from configuration
pub fn create_provider(config: ModelConfig) -> Result<Arc<dyn LanguageModel>, ProviderError> {
    match config.provider {
        ProviderType::Ollama => Ok(Arc::new(OllamaProvider::new(config))),
        ProviderType::OpenAI | ProviderType::Groq | ProviderType::Gemini => {
            Ok(Arc::new(OpenAICompatibleProvider::new(config)?))
        }
    }
}

fn build_client(config: &ModelConfig) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .unwrap_or_default()
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::AuthError(format!("HTTP {}: {}", status, message)));
    }
    Err(ProviderError::ModelError {
        status: status.as_u16(),
        message,
    })
}

// ============================================================================
// Ollama Provider
// ============================================================================

pub struct OllamaProvider {
    config: ModelConfig,
    client: Client,
}

impl OllamaProvider {
    pub fn new(config: ModelConfig) -> Self {
        let client = build_client(&config);
        Self { config, client }
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a serde_json::Value>,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<usize>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        response_format: Option<&ResponseFormat>,
    ) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/api/chat", self.config.url.trim_end_matches('/'));

        let request = OllamaChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            format: response_format.map(|f| &f.schema),
            options: OllamaOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_send)?;

        let chat_response: OllamaChatResponse = error_for_status(response).await?.json().await?;

        if chat_response.message.content.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(
                "Empty message content".to_string(),
            ));
        }

        Ok(CompletionResponse {
            content: MessageContent::Text(chat_response.message.content),
            model: chat_response.model,
            finish_reason: chat_response.done_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// OpenAI-compatible Provider (OpenAI, Groq, Gemini)
// ============================================================================

pub struct OpenAICompatibleProvider {
    config: ModelConfig,
    client: Client,
    api_key: String,
}

impl OpenAICompatibleProvider {
    pub fn new(config: ModelConfig) -> Result<Self, ProviderError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ProviderError::AuthError(format!("{} API key not found", config.provider))
        })?;

        let client = build_client(&config);
        Ok(Self {
            config,
            client,
            api_key,
        })
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAIResponseFormat<'a>>,
}

#[derive(Serialize)]
struct OpenAIResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: &'a ResponseFormat,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<MessageContent>,
}

#[async_trait]
impl LanguageModel for OpenAICompatibleProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        response_format: Option<&ResponseFormat>,
    ) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.config.url.trim_end_matches('/'));

        let request = OpenAIRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
            response_format: response_format.map(|f| OpenAIResponseFormat {
                kind: "json_schema",
                json_schema: f,
            }),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_send)?;

        let openai_response: OpenAIResponse = error_for_status(response).await?.json().await?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| ProviderError::InvalidResponse("Choice has no content".to_string()))?;

        Ok(CompletionResponse {
            content,
            model: openai_response.model,
            finish_reason: choice.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        a: i64,
        b: i64,
    }

    #[test]
    fn test_ollama_provider_creation() {
        let config = ModelConfig::default();
        let provider = create_provider(config).unwrap();
        assert_eq!(provider.model_name(), "qwen3:8b");
    }

    #[test]
    fn test_openai_provider_requires_key() {
        let config = ModelConfig {
            provider: ProviderType::OpenAI,
            api_key: None,
            ..Default::default()
        };
        assert!(matches!(
            OpenAICompatibleProvider::new(config),
            Err(ProviderError::AuthError(_))
        ));
    }

    #[test]
    fn test_content_parses_string_and_value() {
        let text = MessageContent::Text(r#"{"a": 1, "b": 2}"#.to_string());
        assert_eq!(text.parse::<Pair>().unwrap(), Pair { a: 1, b: 2 });

        let value = MessageContent::Json(json!({"a": 3, "b": 4}));
        assert_eq!(value.parse::<Pair>().unwrap(), Pair { a: 3, b: 4 });
    }

    #[test]
    fn test_content_strips_code_fence() {
        let fenced = MessageContent::Text("```json\n{\"a\": 5, \"b\": 6}\n```".to_string());
        assert_eq!(fenced.parse::<Pair>().unwrap(), Pair { a: 5, b: 6 });
    }

    #[test]
    fn test_content_rejects_schema_mismatch() {
        let missing = MessageContent::Json(json!({"a": 1}));
        assert!(missing.parse::<Pair>().is_err());

        let garbage = MessageContent::Text("not json".to_string());
        assert!(garbage.parse::<Pair>().is_err());
    }

    #[test]
    fn test_openai_choice_content_forms() {
        let body = json!({
            "model": "gemini-2.0-flash",
            "choices": [
                { "message": { "content": "{\"a\":1,\"b\":2}" }, "finish_reason": "stop" }
            ]
        });
        let parsed: OpenAIResponse = serde_json::from_value(body).unwrap();
        let content = parsed.choices[0].message.content.clone().unwrap();
        assert!(matches!(content, MessageContent::Text(_)));

        let body = json!({
            "choices": [ { "message": { "content": {"a": 1, "b": 2} }, "finish_reason": null } ]
        });
        let parsed: OpenAIResponse = serde_json::from_value(body).unwrap();
        let content = parsed.choices[0].message.content.clone().unwrap();
        assert!(matches!(content, MessageContent::Json(_)));
    }

    #[test]
    fn test_openai_request_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let format = ResponseFormat::json_schema("pair", json!({"type": "object"}));
        let request = OpenAIRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.2,
            top_p: 0.6,
            max_tokens: None,
            response_format: Some(OpenAIResponseFormat {
                kind: "json_schema",
                json_schema: &format,
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "pair");
        assert_eq!(value["response_format"]["json_schema"]["strict"], true);
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_ollama_request_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let format = ResponseFormat::json_schema("pair", json!({"type": "object"}));
        let request = OllamaChatRequest {
            model: "qwen3:8b",
            messages: &messages,
            stream: false,
            format: Some(&format.schema),
            options: OllamaOptions {
                temperature: 0.2,
                top_p: 0.5,
                num_predict: Some(256),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "qwen3:8b");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["format"], json!({"type": "object"}));
        assert_eq!(value["options"]["temperature"], 0.2f32 as f64);
        assert_eq!(value["options"]["top_p"], 0.5);
        assert_eq!(value["options"]["num_predict"], 256);

        let plain = OllamaChatRequest {
            model: "qwen3:8b",
            messages: &messages,
            stream: false,
            format: None,
            options: OllamaOptions {
                temperature: 0.7,
                top_p: 0.9,
                num_predict: None,
            },
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("format").is_none());
        assert!(value["options"].get("num_predict").is_none());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::ModelError { status: 429, message: String::new() }.is_retryable());
        assert!(ProviderError::ModelError { status: 503, message: String::new() }.is_retryable());
        assert!(!ProviderError::ModelError { status: 400, message: String::new() }.is_retryable());
        assert!(!ProviderError::AuthError("nope".to_string()).is_retryable());
    }
}
