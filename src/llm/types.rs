use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  System,
  User,
  Assistant,
  Tool,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::System => "system",
      Role::User => "user",
      Role::Assistant => "assistant",
      Role::Tool => "tool",
    }
  }
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelToolCall {
  pub id: String,
  pub name: String,
  pub arguments: Value,
}

impl ModelToolCall {
  /// Arguments as the JSON-encoded string the chat API expects back.
  pub fn arguments_string(&self) -> String {
    match &self.arguments {
      Value::String(raw) => raw.clone(),
      other => other.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
  /// Only on assistant messages
  pub tool_calls: Vec<ModelToolCall>,
  /// Only on tool messages
  pub tool_call_id: Option<String>,
}

impl ChatMessage {
  fn new(role: Role, content: impl Into<String>) -> Self {
    Self {
      role,
      content: content.into(),
      tool_calls: Vec::new(),
      tool_call_id: None,
    }
  }

  pub fn system(content: impl Into<String>) -> Self {
    Self::new(Role::System, content)
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self::new(Role::User, content)
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self::new(Role::Assistant, content)
  }

  pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ModelToolCall>) -> Self {
    Self {
      tool_calls,
      ..Self::new(Role::Assistant, content)
    }
  }

  pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      tool_call_id: Some(tool_call_id.into()),
      ..Self::new(Role::Tool, content)
    }
  }

  /// Chat-completions wire form.
  pub fn to_json(&self) -> Value {
    let mut msg = json!({
      "role": self.role.as_str(),
      "content": self.content,
    });

    if !self.tool_calls.is_empty() {
      msg["tool_calls"] = self
        .tool_calls
        .iter()
        .map(|call| {
          json!({
            "id": call.id,
            "type": "function",
            "function": {
              "name": call.name,
              "arguments": call.arguments_string(),
            }
          })
        })
        .collect();
    }

    if let Some(id) = &self.tool_call_id {
      msg["tool_call_id"] = json!(id);
    }

    msg
  }
}

/// One non-streaming model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
  pub content: String,
  pub tool_calls: Vec<ModelToolCall>,
}

impl Completion {
  pub fn text(content: impl Into<String>) -> Self {
    Self {
      content: content.into(),
      tool_calls: Vec::new(),
    }
  }

  pub fn tools(tool_calls: Vec<ModelToolCall>) -> Self {
    Self {
      content: String::new(),
      tool_calls,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_assistant_tool_calls_wire_form() {
    let msg = ChatMessage::assistant_with_tools(
      "",
      vec![ModelToolCall {
        id: "call_0".to_string(),
        name: "get_issue".to_string(),
        arguments: json!({ "issue_key": "ODPP-1" }),
      }],
    );
    let json = msg.to_json();
    assert_eq!(json["role"], "assistant");
    assert_eq!(json["tool_calls"][0]["id"], "call_0");
    assert_eq!(
      json["tool_calls"][0]["function"]["arguments"],
      "{\"issue_key\":\"ODPP-1\"}"
    );
    assert!(json.get("tool_call_id").is_none());
  }

  #[test]
  fn test_tool_message_wire_form() {
    let json = ChatMessage::tool("call_3", "{}").to_json();
    assert_eq!(json["role"], "tool");
    assert_eq!(json["tool_call_id"], "call_3");
    assert!(json.get("tool_calls").is_none());
  }
}
