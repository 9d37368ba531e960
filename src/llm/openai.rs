//! Chat-completions client for OpenAI-compatible endpoints (Groq by default).

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::sse::SseLineDecoder;
use super::types::{ChatMessage, Completion, ModelToolCall};
use super::{ChatModel, LlmError, TokenStream};
use crate::config::LlmConfig;
use crate::tools::ToolDefinition;

pub struct OpenAiCompatClient {
  client: Client,
  api_key: String,
  base_url: String,
  model: String,
  max_output_tokens: u32,
}

impl OpenAiCompatClient {
  pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      api_key: api_key.into(),
      base_url: base_url.into(),
      model: "llama-3.3-70b-versatile".to_string(),
      max_output_tokens: 4096,
    }
  }

  pub fn from_config(config: &LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
    let api_key = api_key
      .filter(|k| !k.is_empty())
      .ok_or(LlmError::MissingApiKey)?;
    Ok(
      Self::new(api_key, config.url.clone())
        .with_model(config.model.clone())
        .with_max_output_tokens(config.max_output_tokens),
    )
  }

  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }

  pub fn with_max_output_tokens(mut self, max: u32) -> Self {
    self.max_output_tokens = max;
    self
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
  }

  fn build_body(&self, messages: &[ChatMessage], tools: &[ToolDefinition], stream: bool) -> Value {
    let mut body = json!({
      "model": self.model,
      "messages": messages.iter().map(ChatMessage::to_json).collect::<Vec<_>>(),
      "max_tokens": self.max_output_tokens,
      "stream": stream,
    });

    if !tools.is_empty() {
      body["tools"] = json!(tools);
      body["tool_choice"] = json!("auto");
    }

    body
  }

  async fn post(&self, body: &Value) -> Result<reqwest::Response, LlmError> {
    let response = self
      .client
      .post(self.endpoint())
      .header("Authorization", format!("Bearer {}", self.api_key))
      .json(body)
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status().as_u16();
      let body = response.text().await?;
      return Err(LlmError::Api { status, body });
    }
    Ok(response)
  }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
  async fn complete(
    &self,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
  ) -> Result<Completion, LlmError> {
    debug!(model = %self.model, messages = messages.len(), "requesting completion");
    let body = self.build_body(messages, tools, false);
    let response: ApiCompletion = self.post(&body).await?.json().await?;
    parse_completion(response)
  }

  async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, LlmError> {
    debug!(model = %self.model, messages = messages.len(), "requesting streamed answer");
    let body = self.build_body(messages, &[], true);
    let mut bytes = self.post(&body).await?.bytes_stream();

    let stream = async_stream::stream! {
      let mut decoder = SseLineDecoder::new();
      while let Some(chunk) = bytes.next().await {
        match chunk {
          Ok(chunk) => {
            for text in decoder.push(&chunk) {
              yield Ok(text);
            }
          }
          Err(e) => {
            yield Err(LlmError::Stream(e.to_string()));
            return;
          }
        }
        if decoder.is_done() {
          return;
        }
      }
      for text in decoder.finish() {
        yield Ok(text);
      }
    };

    Ok(Box::pin(stream))
  }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiCompletion {
  #[serde(default)]
  choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
  message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
  content: Option<String>,
  #[serde(default)]
  tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
  id: Option<String>,
  function: ApiFunction,
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
  name: String,
  /// Usually a JSON-encoded string, occasionally an object
  #[serde(default)]
  arguments: Value,
}

fn parse_completion(response: ApiCompletion) -> Result<Completion, LlmError> {
  let choice = response
    .choices
    .into_iter()
    .next()
    .ok_or(LlmError::EmptyResponse)?;

  let tool_calls = choice
    .message
    .tool_calls
    .unwrap_or_default()
    .into_iter()
    .enumerate()
    .map(|(idx, call)| ModelToolCall {
      id: call
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("call_{}", idx)),
      name: call.function.name,
      arguments: decode_arguments(call.function.arguments),
    })
    .collect();

  Ok(Completion {
    content: choice.message.content.unwrap_or_default(),
    tool_calls,
  })
}

/// Decode string-encoded arguments; anything unparsable is passed on as-is
/// for the tool layer to reject.
fn decode_arguments(arguments: Value) -> Value {
  match arguments {
    Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tools::tool_definitions;

  fn client() -> OpenAiCompatClient {
    OpenAiCompatClient::new("gsk-test", "https://api.groq.com/openai/v1/")
  }

  #[test]
  fn test_from_config_requires_api_key() {
    let config = LlmConfig::default();
    assert!(matches!(
      OpenAiCompatClient::from_config(&config, None),
      Err(LlmError::MissingApiKey)
    ));
    assert!(matches!(
      OpenAiCompatClient::from_config(&config, Some(String::new())),
      Err(LlmError::MissingApiKey)
    ));

    let client = OpenAiCompatClient::from_config(&config, Some("key".into())).unwrap();
    assert_eq!(client.model, "llama-3.3-70b-versatile");
    assert_eq!(client.max_output_tokens, 4096);
  }

  #[test]
  fn test_endpoint() {
    assert_eq!(
      client().endpoint(),
      "https://api.groq.com/openai/v1/chat/completions"
    );
  }

  #[test]
  fn test_body_with_tools() {
    let tools = tool_definitions();
    let body = client().build_body(&[ChatMessage::user("hi")], &tools, false);

    assert_eq!(body["model"], "llama-3.3-70b-versatile");
    assert_eq!(body["max_tokens"], 4096);
    assert_eq!(body["stream"], false);
    assert_eq!(body["tool_choice"], "auto");
    assert_eq!(body["tools"].as_array().unwrap().len(), 4);
    assert_eq!(body["messages"][0]["content"], "hi");
  }

  #[test]
  fn test_stream_body_has_no_tools() {
    let body = client().build_body(&[ChatMessage::user("hi")], &[], true);
    assert_eq!(body["stream"], true);
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
  }

  #[test]
  fn test_parse_tool_calls() {
    let response: ApiCompletion = serde_json::from_value(json!({
      "choices": [{
        "message": {
          "content": null,
          "tool_calls": [
            { "id": "", "type": "function",
              "function": { "name": "prepare_search", "arguments": "{\"names\":[\"ana\"]}" } },
            { "id": "call_abc", "type": "function",
              "function": { "name": "get_issue", "arguments": "{broken" } }
          ]
        }
      }]
    }))
    .unwrap();

    let completion = parse_completion(response).unwrap();
    assert_eq!(completion.content, "");
    assert_eq!(completion.tool_calls[0].id, "call_0");
    assert_eq!(completion.tool_calls[0].arguments, json!({ "names": ["ana"] }));
    assert_eq!(completion.tool_calls[1].id, "call_abc");
    assert_eq!(completion.tool_calls[1].arguments, json!("{broken"));
  }

  #[test]
  fn test_parse_plain_answer() {
    let response: ApiCompletion = serde_json::from_value(json!({
      "choices": [{ "message": { "content": "3 issues are in QA." } }]
    }))
    .unwrap();
    let completion = parse_completion(response).unwrap();
    assert_eq!(completion.content, "3 issues are in QA.");
    assert!(completion.tool_calls.is_empty());
  }

  #[test]
  fn test_empty_choices() {
    let response: ApiCompletion = serde_json::from_value(json!({ "choices": [] })).unwrap();
    assert!(matches!(
      parse_completion(response),
      Err(LlmError::EmptyResponse)
    ));
  }
}
