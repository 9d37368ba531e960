//! Language model access.
//!
//! The agent loop only sees [`ChatModel`]: one call that completes a
//! conversation (possibly with tool calls) and one that streams a plain
//! answer token by token.

mod openai;
#[cfg(test)]
pub mod scripted;
mod sse;
mod types;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::tools::ToolDefinition;

pub use openai::OpenAiCompatClient;
pub use sse::SseLineDecoder;
pub use types::{ChatMessage, Completion, ModelToolCall, Role};

#[derive(Error, Debug)]
pub enum LlmError {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("HTTP {status}: {body}")]
  Api { status: u16, body: String },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Stream error: {0}")]
  Stream(String),

  #[error("model returned no choices")]
  EmptyResponse,

  #[error("language model API key not configured (set PMBOT_LLM_API_KEY or GROQ_API_KEY)")]
  MissingApiKey,
}

pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[async_trait]
pub trait ChatModel: Send + Sync {
  /// Complete the conversation, letting the model request any of `tools`.
  async fn complete(
    &self,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
  ) -> Result<Completion, LlmError>;

  /// Stream a plain-text answer to the conversation.
  async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, LlmError>;
}
