use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

/// Progress of one agent turn, in the order it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
  ToolCall { name: String, arguments: Value },
  ToolResult { name: String, result: Value },
  /// A recoverable tool failure, handed back to the model
  ToolError { name: String, message: String },
  /// Piece of the final answer
  Chunk(String),
  /// Result worth rendering for the user as-is
  StructuredData(Value),
  Done,
  IterationLimit,
}

/// Optional event channel; sends to a closed or absent receiver are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<UnboundedSender<AgentEvent>>);

impl EventSink {
  pub fn new(tx: UnboundedSender<AgentEvent>) -> Self {
    Self(Some(tx))
  }

  pub fn none() -> Self {
    Self(None)
  }

  pub fn emit(&self, event: AgentEvent) {
    if let Some(tx) = &self.0 {
      let _ = tx.send(event);
    }
  }
}
