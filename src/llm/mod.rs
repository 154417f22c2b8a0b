//! Language model boundary: provider trait, HTTP providers, strict schemas
//! and retry policy.

pub mod provider;
pub mod retry;
pub mod schema;

pub use provider::{
    create_provider, ChatMessage, CompletionResponse, LanguageModel, MessageContent,
    OllamaProvider, OpenAICompatibleProvider, ProviderError, ResponseFormat, Role,
};
pub use retry::{Retryable, RetryPolicy};
pub use schema::strict_response_format;
