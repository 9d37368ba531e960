//! The bounded tool-calling loop.

use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::events::{AgentEvent, EventSink};
use super::history::History;
use super::prompt::system_prompt;
use crate::error::AssistantError;
use crate::llm::{ChatMessage, ChatModel, LlmError};
use crate::tools::ToolExecutor;

pub const ITERATION_LIMIT_ANSWER: &str =
  "I couldn't finish answering within the allowed number of steps. Try a narrower question.";

#[derive(Error, Debug)]
pub enum AgentError {
  #[error("{0}")]
  Tool(#[from] AssistantError),

  #[error("language model request failed: {0}")]
  Model(#[from] LlmError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
  Complete,
  /// The iteration cap was hit before the model produced an answer
  IterationLimit,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
  pub answer: String,
  pub status: CompletionStatus,
  /// Structured payloads from successful tools, in call order
  pub structured: Vec<Value>,
  /// Full conversation, including tool traffic
  pub messages: Vec<ChatMessage>,
}

pub struct Orchestrator {
  model: Arc<dyn ChatModel>,
  tools: Arc<ToolExecutor>,
  project_key: Option<String>,
  max_iterations: usize,
  stream_final: bool,
}

impl Orchestrator {
  pub fn new(model: Arc<dyn ChatModel>, tools: Arc<ToolExecutor>) -> Self {
    Self {
      model,
      tools,
      project_key: None,
      max_iterations: 10,
      stream_final: false,
    }
  }

  pub fn with_project_key(mut self, project_key: Option<String>) -> Self {
    self.project_key = project_key;
    self
  }

  pub fn with_max_iterations(mut self, max: usize) -> Self {
    self.max_iterations = max;
    self
  }

  /// Re-request the final answer as a token stream.
  pub fn with_streaming(mut self, stream_final: bool) -> Self {
    self.stream_final = stream_final;
    self
  }

  pub fn tools(&self) -> &Arc<ToolExecutor> {
    &self.tools
  }

  /// Answer `question` in the context of `history`.
  pub async fn ask(
    &self,
    history: &History,
    question: &str,
    events: &EventSink,
  ) -> Result<AgentOutcome, AgentError> {
    let facts = self.tools.cache().get_all().await?;
    let prompt = system_prompt(&facts, self.project_key.as_deref());
    self.run(history.messages(prompt, question), events).await
  }

  /// Drive the model until it answers without tool calls or the cap is hit.
  pub async fn run(
    &self,
    mut messages: Vec<ChatMessage>,
    events: &EventSink,
  ) -> Result<AgentOutcome, AgentError> {
    let definitions = self.tools.definitions();
    let mut structured = Vec::new();

    for iteration in 1..=self.max_iterations {
      let completion = self.model.complete(&messages, &definitions).await?;
      debug!(iteration, tool_calls = completion.tool_calls.len(), "model replied");

      if completion.tool_calls.is_empty() {
        let answer = if self.stream_final {
          self.stream_answer(&messages, events).await?
        } else {
          events.emit(AgentEvent::Chunk(completion.content.clone()));
          completion.content
        };
        messages.push(ChatMessage::assistant(answer.clone()));
        events.emit(AgentEvent::Done);
        info!(iterations = iteration, "agent turn complete");
        return Ok(AgentOutcome {
          answer,
          status: CompletionStatus::Complete,
          structured,
          messages,
        });
      }

      messages.push(ChatMessage::assistant_with_tools(
        completion.content,
        completion.tool_calls.clone(),
      ));

      for call in completion.tool_calls {
        events.emit(AgentEvent::ToolCall {
          name: call.name.clone(),
          arguments: call.arguments.clone(),
        });

        let content = match self.tools.execute_raw(&call.name, call.arguments).await {
          Ok(output) => {
            if let Some(payload) = output.structured_payload() {
              events.emit(AgentEvent::StructuredData(payload.clone()));
              structured.push(payload);
            }
            let result = output.to_json();
            let content = result.to_string();
            events.emit(AgentEvent::ToolResult {
              name: call.name,
              result,
            });
            content
          }
          Err(e) if e.is_fatal() => return Err(e.into()),
          Err(e) => {
            let message = e.to_string();
            events.emit(AgentEvent::ToolError {
              name: call.name,
              message: message.clone(),
            });
            json!({ "error": message }).to_string()
          }
        };
        messages.push(ChatMessage::tool(call.id, content));
      }
    }

    warn!(max = self.max_iterations, "tool iteration limit reached");
    events.emit(AgentEvent::IterationLimit);
    events.emit(AgentEvent::Chunk(ITERATION_LIMIT_ANSWER.to_string()));
    events.emit(AgentEvent::Done);
    Ok(AgentOutcome {
      answer: ITERATION_LIMIT_ANSWER.to_string(),
      status: CompletionStatus::IterationLimit,
      structured,
      messages,
    })
  }

  async fn stream_answer(
    &self,
    messages: &[ChatMessage],
    events: &EventSink,
  ) -> Result<String, LlmError> {
    let mut stream = self.model.stream(messages).await?;
    let mut answer = String::new();
    while let Some(chunk) = stream.next().await {
      let chunk = chunk?;
      answer.push_str(&chunk);
      events.emit(AgentEvent::Chunk(chunk));
    }
    Ok(answer)
  }
}
