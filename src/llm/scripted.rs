//! Model double that replays canned completions.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ChatMessage, ChatModel, Completion, LlmError, ModelToolCall, TokenStream};
use crate::tools::ToolDefinition;

pub struct ScriptedModel {
  completions: Mutex<VecDeque<Completion>>,
  /// Answer returned for every streaming request, split on spaces
  streamed: String,
  /// Conversation seen by each `complete` call
  seen: Mutex<Vec<Vec<ChatMessage>>>,
  /// Repeat the last completion once the script runs out
  repeat_last: bool,
}

impl ScriptedModel {
  pub fn new(completions: Vec<Completion>) -> Self {
    Self {
      completions: Mutex::new(completions.into()),
      streamed: String::new(),
      seen: Mutex::new(Vec::new()),
      repeat_last: false,
    }
  }

  /// Keep answering with the same completion forever.
  pub fn looping(completion: Completion) -> Self {
    Self {
      repeat_last: true,
      ..Self::new(vec![completion])
    }
  }

  pub fn with_streamed(mut self, answer: &str) -> Self {
    self.streamed = answer.to_string();
    self
  }

  pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
    self.seen.lock().unwrap().clone()
  }
}

pub fn call(id: &str, name: &str, arguments: Value) -> ModelToolCall {
  ModelToolCall {
    id: id.to_string(),
    name: name.to_string(),
    arguments,
  }
}

#[async_trait]
impl ChatModel for ScriptedModel {
  async fn complete(
    &self,
    messages: &[ChatMessage],
    _tools: &[ToolDefinition],
  ) -> Result<Completion, LlmError> {
    self.seen.lock().unwrap().push(messages.to_vec());
    let mut completions = self.completions.lock().unwrap();
    match completions.len() {
      0 => Err(LlmError::EmptyResponse),
      1 if self.repeat_last => Ok(completions[0].clone()),
      _ => Ok(completions.pop_front().unwrap_or_default()),
    }
  }

  async fn stream(&self, _messages: &[ChatMessage]) -> Result<TokenStream, LlmError> {
    let tokens: Vec<Result<String, LlmError>> = self
      .streamed
      .split_inclusive(' ')
      .map(|t| Ok(t.to_string()))
      .collect();
    Ok(Box::pin(futures::stream::iter(tokens)))
  }
}
